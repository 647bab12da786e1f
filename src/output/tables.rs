use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use crate::auth::ScopedCredential;
use crate::providers::github::CommitState;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn create_cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Renders the username/password credentials usable for notifications.
///
/// Secrets are never part of the table.
pub fn render_credentials<'a>(credentials: impl IntoIterator<Item = ScopedCredential<'a>>) -> String {
    let mut table = create_table();
    table.set_header(create_cyan_header(&["ID", "Username", "Description", "Store"]));

    for credential in credentials {
        table.add_row(vec![
            Cell::new(credential.id),
            Cell::new(&credential.pair.username),
            Cell::new(credential.description.unwrap_or("-")),
            Cell::new(credential.store).fg(TableColor::DarkGrey),
        ]);
    }

    table.to_string()
}

/// Renders the accepted status values.
pub fn render_states() -> String {
    let mut table = create_table();
    table.set_header(create_cyan_header(&["Status"]));

    for state in CommitState::ALL {
        let color = match state {
            CommitState::Pending => TableColor::Yellow,
            CommitState::Success => TableColor::Green,
            CommitState::Error | CommitState::Failure => TableColor::Red,
        };
        table.add_row(vec![Cell::new(state.name()).fg(color)]);
    }

    table.to_string()
}
