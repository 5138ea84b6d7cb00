use super::dummy_params::{PRM_FILE_NAME, RTF_FILE_NAME};
use std::io::{self, Write};

pub const STREAM_FILE_NAME: &str = "toppar.str";

/// CHARMM36 force-field files shipped in every state's `toppar/` directory.
pub const CHARMM36_FILES: &[&str] = &[
    "toppar/top_all36_prot.rtf",
    "toppar/par_all36m_prot.prm",
    "toppar/top_all36_na.rtf",
    "toppar/par_all36_na.prm",
    "toppar/top_all36_carb.rtf",
    "toppar/par_all36_carb.prm",
    "toppar/top_all36_lipid.rtf",
    "toppar/par_all36_lipid.prm",
    "toppar/top_all36_cgenff.rtf",
    "toppar/par_all36_cgenff.prm",
    "toppar/toppar_water_ions.str",
    "toppar/toppar_dum_noble_gases.str",
    "toppar/toppar_all36_prot_d_aminoacids.str",
    "toppar/toppar_all36_prot_fluoro_alkanes.str",
    "toppar/toppar_all36_prot_heme.str",
    "toppar/toppar_all36_prot_na_combined.str",
    "toppar/toppar_all36_prot_retinol.str",
    "toppar/toppar_all36_na_nad_ppi.str",
    "toppar/toppar_all36_lipid_bacterial.str",
    "toppar/toppar_all36_lipid_cardiolipin.str",
    "toppar/toppar_all36_lipid_cholesterol.str",
    "toppar/toppar_all36_lipid_inositol.str",
    "toppar/toppar_all36_lipid_lps.str",
    "toppar/toppar_all36_lipid_miscellaneous.str",
    "toppar/toppar_all36_lipid_model.str",
    "toppar/toppar_all36_lipid_prot.str",
    "toppar/toppar_all36_lipid_pyrophosphate.str",
    "toppar/toppar_all36_lipid_sphingo.str",
];

/// File name of the ligand topology copied from the base setup.
pub fn ligand_rtf_name(tlc: &str) -> String {
    format!("{}_g.rtf", tlc.to_lowercase())
}

/// File name of the ligand parameters copied from the base setup.
pub fn ligand_prm_name(tlc: &str) -> String {
    format!("{}.prm", tlc.to_lowercase())
}

/// Writes the stream manifest: the force-field files, then the ligand and dummy files.
pub fn write_stream(tlc: &str, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    for file in CHARMM36_FILES {
        writeln!(writer, "{}", file)?;
    }
    writeln!(writer, "{}", ligand_rtf_name(tlc))?;
    writeln!(writer, "{}", ligand_prm_name(tlc))?;
    writeln!(writer, "{}", RTF_FILE_NAME)?;
    writeln!(writer, "{}", PRM_FILE_NAME)?;
    Ok(())
}
