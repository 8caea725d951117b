use anyhow::Result;
use clinic_core::clinic::Clinic;
use clinic_core::session::Session;
use clinic_core::store::AppointmentStore;
use owo_colors::OwoColorize;

pub fn login(clinic: &Clinic) -> Result<()> {
    let mut session = Session::load(clinic.storage());

    if session.is_logged_in() {
        println!("{}", "Already logged in".dimmed());
        return Ok(());
    }

    session.login()?;
    println!("{}", "Logged in".green());
    Ok(())
}

pub fn logout(clinic: &Clinic) -> Result<()> {
    let mut session = Session::load(clinic.storage());

    if !session.is_logged_in() {
        println!("{}", "Not logged in".dimmed());
        return Ok(());
    }

    session.logout()?;
    println!("{}", "Logged out".green());
    Ok(())
}

pub fn status(clinic: &Clinic) -> Result<()> {
    let session = Session::load(clinic.storage());
    let store = AppointmentStore::load(clinic.storage());
    let roster = clinic.roster()?;

    let state = if session.is_logged_in() {
        "logged in".green().to_string()
    } else {
        "logged out".red().to_string()
    };

    println!("Session:      {state}");
    println!("Data:         {}", clinic.display_path().display());
    println!("Appointments: {}", store.len());
    println!(
        "Roster:       {} patients, {} doctors",
        roster.patients.len(),
        roster.doctors.len()
    );
    Ok(())
}
