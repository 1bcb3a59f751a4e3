mod appointment;
mod config_cmd;
mod dashboard;
mod doctor;
mod output;
mod patient;
mod report;
mod status;

use std::io::{self, Write};

use meditrack_core::{Entity, FileStore, ListQuery, Mode, Screen, SyncLayer};

pub use appointment::AppointmentCommand;
pub use config_cmd::ConfigCommand;
pub use dashboard::DashboardCommand;
pub use doctor::DoctorCommand;
pub use patient::PatientCommand;
pub use report::ReportCommand;
pub use status::StatusCommand;

/// The sync layer as the CLI builds it: file-backed local store, HTTP remote.
pub type Layer = SyncLayer<FileStore>;

/// Loads a list through a [`Screen`] so the search filter and notices are
/// applied the same way for every entity type.
async fn load_list<E: Entity>(
    layer: &Layer,
    search: Option<&str>,
    limit: Option<usize>,
) -> Screen<E> {
    let mut query = ListQuery::default_for(E::KIND);
    query.limit = limit;

    let mut screen = Screen::new();
    screen.refresh(layer, query).await;
    if let Some(search) = search {
        screen.set_search(search);
    }

    if layer.mode() == Mode::LocalOnly {
        eprintln!("Demo mode: no remote store configured, data is kept on this device only.");
    }
    if let Some(warning) = screen.warning() {
        eprintln!("Warning: {}", warning);
    }
    screen
}

/// Asks a yes/no question on stdin; anything but `y` means no.
fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
