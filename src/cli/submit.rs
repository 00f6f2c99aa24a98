//! Submit command - run the task in the configured work directory

use crate::cli::progress::CliProgress;
use crate::cli::style::{Stylize, check};
use anstream::println;
use balrog_submit::config::Config;
use balrog_submit::error::Result;
use balrog_submit::registry::create_registry_client;
use balrog_submit::submit::{Submitter, resolve_action};
use balrog_submit::task::{DiskManifestLoader, get_task, get_task_server};
use tracing::info;

/// Run the task described by `config`
pub async fn run_submit(config: &Config) -> Result<()> {
    let task = get_task(config)?;
    let action = resolve_action(&task, &config.taskcluster_scope_prefixes);

    let server = get_task_server(&task, config)?;
    let (auth, registry_config) = config.resolve_server(&server)?;
    info!(
        server = %server,
        api_root = %registry_config.api_root,
        dummy = registry_config.dummy,
        "using registry server"
    );

    let registry = create_registry_client(auth, &registry_config)?;
    let retry = config.retry.to_policy()?;
    let manifest = DiskManifestLoader::new(&config.work_dir);
    let progress = CliProgress;

    println!(
        "Running {} against {}{}",
        action.to_string().accent(),
        registry_config.api_root.emphasis(),
        if registry_config.dummy { " (dummy)" } else { "" }
    );

    let submitter = Submitter::new(registry.as_ref(), retry, &progress)
        .with_scope_prefixes(config.taskcluster_scope_prefixes.clone());
    let result = submitter.run(&task, &manifest).await?;

    println!();
    println!(
        "{} {} complete: {} registry call{}",
        check(),
        result.action,
        result.calls.accent(),
        if result.calls == 1 { "" } else { "s" }
    );

    Ok(())
}
