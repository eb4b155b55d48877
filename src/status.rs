// System status display: which backend is in use and what the quote table
// holds.

use anyhow::Result;
use std::sync::Arc;

use crate::db::QuoteStore;

/// Display system status to the terminal.
pub async fn show(db: &Arc<dyn QuoteStore>, db_display: &str, table: &str) -> Result<()> {
    println!("Database: {} ({})", db_display, db.backend());

    let summary = db.table_summary(table).await?;
    crate::output::terminal::display_table_summary(&summary);

    if summary.rows == 0 {
        println!("\nThe quote table is empty. Load quote tweets into it before running `quotecoder extract`.");
    }
    Ok(())
}
