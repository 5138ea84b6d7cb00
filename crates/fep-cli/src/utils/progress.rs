use fepladder::engine::progress::{Progress, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK: Duration = Duration::from_millis(80);
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
const BAR_TEMPLATE: &str = "{prefix:<20} {msg:<12} [{bar:40.cyan/blue}] {pos}/{len} ({eta})";

/// Renders library progress events on one indicatif bar.
///
/// The phase name becomes the bar prefix; the state pair being loaded (or the state being
/// written) becomes its message.
#[derive(Clone)]
pub struct CliProgressHandler {
    bar: Arc<Mutex<ProgressBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
        bar.finish_and_clear();
        Self {
            bar: Arc::new(Mutex::new(bar)),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let bar = Arc::clone(&self.bar);
        Box::new(move |event| match bar.lock() {
            Ok(bar) => render(&bar, event),
            Err(_) => warn!("Progress bar mutex was poisoned. Cannot update progress."),
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

fn render(bar: &ProgressBar, event: Progress) {
    match event {
        Progress::PhaseStart { name } => {
            bar.reset();
            bar.set_length(0);
            bar.set_style(style(SPINNER_TEMPLATE));
            bar.set_prefix(name);
            bar.set_message(name);
            bar.enable_steady_tick(SPINNER_TICK);
        }
        Progress::TaskStart { total_steps } => {
            bar.disable_steady_tick();
            bar.reset();
            bar.set_length(total_steps);
            bar.set_style(style(BAR_TEMPLATE).progress_chars("##-"));
            bar.set_message("");
        }
        Progress::PairProcessed {
            potential_state,
            conformation_state,
        } => bar.set_message(format!("{}→{}", potential_state, conformation_state)),
        Progress::StateWritten { index } => bar.set_message(format!("intst{}", index)),
        Progress::TaskIncrement => bar.inc(1),
        Progress::TaskFinish => {
            if let Some(length) = bar.length() {
                bar.set_position(length);
            }
            bar.finish();
        }
        Progress::PhaseFinish => {
            bar.disable_steady_tick();
            bar.set_style(style(SPINNER_TEMPLATE));
            bar.finish_with_message("✓ Done");
        }
        Progress::Message(text) if bar.is_finished() => bar.set_message(text),
        Progress::Message(text) => bar.println(format!("  {}", text)),
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_starts_finished_and_empty() {
        let handler = CliProgressHandler::new();
        let bar = handler.bar.lock().unwrap();
        assert_eq!(bar.length(), Some(0));
        assert!(bar.is_finished());
    }

    #[test]
    fn loading_pairs_shows_the_current_pair() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Loading Energies",
        });
        assert_eq!(handler.bar.lock().unwrap().prefix(), "Loading Energies");

        callback(Progress::TaskStart { total_steps: 4 });
        callback(Progress::PairProcessed {
            potential_state: 1,
            conformation_state: 2,
        });
        callback(Progress::TaskIncrement);
        {
            let bar = handler.bar.lock().unwrap();
            assert_eq!(bar.length(), Some(4));
            assert_eq!(bar.position(), 1);
            assert_eq!(bar.message(), "1→2");
        }

        callback(Progress::TaskFinish);
        assert_eq!(handler.bar.lock().unwrap().position(), 4);

        callback(Progress::PhaseFinish);
        callback(Progress::Message("Loaded 4 pair files".into()));
        let bar = handler.bar.lock().unwrap();
        assert!(bar.is_finished());
        assert_eq!(bar.message(), "Loaded 4 pair files");
    }

    #[test]
    fn callback_can_be_driven_from_another_thread() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "Energy Re-evaluation",
            });
            callback(Progress::StateWritten { index: 3 });
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        let bar = handler.bar.lock().unwrap();
        assert!(bar.is_finished());
        assert_eq!(bar.message(), "✓ Done");
    }
}
