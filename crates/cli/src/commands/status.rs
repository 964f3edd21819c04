use om::SessionManager;
use tracing::info;

use crate::error::Result;
use crate::render;

pub async fn execute(manager: &SessionManager, json: bool) -> Result<()> {
	let status = manager.fetch_status().await?;
	info!(target = "om", count = status.count, servers = status.servers.len(), "fetched status");

	if json {
		println!("{}", serde_json::to_string_pretty(&status)?);
	} else {
		println!("{}", render::status_summary(&status));
	}
	Ok(())
}
