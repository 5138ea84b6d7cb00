use crate::cli::PlanArgs;
use crate::config::build_config;
use crate::error::Result;
use fepladder::core::mutation::lambda;
use tracing::{info, warn};

pub fn run(args: PlanArgs) -> Result<()> {
    let app = build_config(&args.config)?;
    let config = &app.core_config;
    println!("System: {}", config.system_name());

    for name in app.select_structures(args.structure.as_deref())? {
        let mutations = app.mutations_for(&name)?;
        let plan = app.plan_for(&name)?;
        info!(structure = %name, states = plan.len(), "Planned intermediate states.");

        println!(
            "\nStructure '{}' -> {} ({} intermediate states, strategy: {})",
            name,
            config.ladder_dir(&name).display(),
            plan.len(),
            plan.strategy()
        );
        if plan.is_empty() {
            warn!(structure = %name, "No mutations configured.");
            println!("  (no mutations configured)");
            continue;
        }
        println!("  {:<8} {:<10} {:>6} {:>8}", "state", "mutation", "step", "lambda");
        for state in plan.iter() {
            let mutation = &mutations[state.mutation];
            println!(
                "  {:<8} {:<10} {:>6} {:>8.4}",
                format!("intst{}", state.index),
                mutation.name(),
                state.step,
                lambda(state.step, mutation.nr_of_steps())
            );
        }
    }

    Ok(())
}
