//! Version command

use crate::app::AppContext;

/// Run the version command.
pub fn run(app: &AppContext) {
    let version = env!("CARGO_PKG_VERSION");

    if app.is_json() {
        println!(r#"{{"version":"{version}"}}"#);
    } else {
        println!("nodeboot {version}");
    }
}
