use anyhow::Result;
use clinic_core::clinic::Clinic;
use owo_colors::OwoColorize;

pub fn run(clinic: &Clinic) -> Result<()> {
    let roster = clinic.roster()?;

    println!("{}", "Patients".bold());
    for patient in &roster.patients {
        println!("  {} {}", format!("{:>3}", patient.id).dimmed(), patient.name);
    }

    println!();
    println!("{}", "Doctors".bold());
    for doctor in &roster.doctors {
        println!("  {} {}", format!("{:>3}", doctor.id).dimmed(), doctor.name);
    }

    if !clinic.roster_path().exists() {
        println!();
        println!(
            "{}",
            format!("Built-in roster. Write {} to use your own.", clinic.roster_path().display())
                .dimmed()
        );
    }

    Ok(())
}
