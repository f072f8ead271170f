//! Leihe-Handler – mutierende Kommandos auf dem Bestand

use leihbar_data::{DatenResult, DatenService};
use leihbar_protocol::{CreateLoanArgs, NutzDaten, ReturnLaptopArgs};

/// CREATE_LOAN
pub async fn leihe_anlegen<D: DatenService>(
    daten: &D,
    args: &CreateLoanArgs,
) -> DatenResult<NutzDaten> {
    let leihe = daten.leihe_anlegen(args.student_id, args.laptop_id).await?;
    Ok(NutzDaten::Leihe(leihe))
}

/// RETURN_LAPTOP
pub async fn laptop_zurueckgeben<D: DatenService>(
    daten: &D,
    args: &ReturnLaptopArgs,
) -> DatenResult<NutzDaten> {
    let leihe = daten.leihe_zurueckgeben(args.leih_id).await?;
    Ok(NutzDaten::Leihe(leihe))
}
