//! Session commands

use crate::output::{self, OutputFormat};
use crate::portal::{describe, Portal};
use anyhow::Result;
use podium_common::auth::Role;
use podium_core::{route, View};
use serde::Serialize;

#[derive(Serialize)]
struct WhoAmI<'a> {
    username: &'a str,
    display_name: Option<&'a str>,
    role: Option<Role>,
    user_view: String,
    admin_view: String,
}

pub fn handle_whoami(portal: &Portal, format: OutputFormat) -> Result<()> {
    let state = portal.session.state;
    let report = WhoAmI {
        username: &portal.username,
        display_name: portal.session.display_name.as_deref(),
        role: portal.session.role(),
        user_view: describe(route(View::User, state)),
        admin_view: describe(route(View::Admin, state)),
    };

    if format != OutputFormat::Table {
        return output::print_single(&report, format);
    }

    match report.role {
        Some(role) => {
            let name = report.display_name.unwrap_or(report.username);
            output::print_success(&format!("Signed in as {} ({})", name, role));
        }
        None => output::print_warning(&format!(
            "Signed in as {} but the session could not be validated",
            report.username
        )),
    }
    println!("  User view:  {}", report.user_view);
    println!("  Admin view: {}", report.admin_view);

    Ok(())
}
