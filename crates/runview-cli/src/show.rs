use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use runview_core::{ArtifactClient, ArtifactDir, ClientConfig, RunPayload, RunSession};

use crate::args::ShowArgs;
use crate::render;

pub async fn run(args: ShowArgs) -> Result<i32> {
    let (data, error): (Option<Arc<RunPayload>>, Option<String>) = if let Some(dir) = &args.path {
        debug!(path = %dir, "loading local artifact directory");
        match ArtifactDir::resolve(dir).and_then(|source| source.load(args.max_rows)) {
            Ok(payload) => (Some(Arc::new(payload)), None),
            Err(e) => (None, Some(e.to_string())),
        }
    } else {
        let config = match &args.url {
            Some(url) => ClientConfig::default().with_url(url.as_str()),
            None => ClientConfig::from_env(),
        };
        let client = ArtifactClient::new(config)?;
        debug!(url = %client.base_url(), "starting fetch session");

        let mut session = RunSession::new();
        session.start(&client, args.max_rows);
        session.join().await;

        let snapshot = session.snapshot();
        (snapshot.data, snapshot.error)
    };

    let failed = error.is_some();
    print!("{}", render::render_report(data.as_deref(), error.as_deref()));

    Ok(if failed { 1 } else { 0 })
}
