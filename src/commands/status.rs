use anyhow::Result;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::store::PageStore;

pub fn run(args: StatusArgs) -> Result<()> {
    info!(db_path = %args.db_path.display(), "status requested");

    if !args.db_path.exists() {
        warn!(path = %args.db_path.display(), "store file missing");
        return Ok(());
    }

    let store = PageStore::open(&args.db_path)?;
    let total = store.count_pages()?;
    let under_parent = store.count_by_parent(&args.parent_slug)?;

    info!(
        path = %args.db_path.display(),
        pages_total = total,
        parent_slug = %args.parent_slug,
        pages_under_parent = under_parent,
        "store status"
    );

    Ok(())
}
