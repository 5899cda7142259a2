//! Interactive tree browser.
//!
//! Each round renders the tree, lets the user pick a row or an action, and
//! shows the resulting notice. Failures never leave the loop; only input
//! errors do.

use dialoguer::{Confirm, Input, Select};

use crate::output;
use sdbridge_core::error::AppError;
use sdbridge_service::notice::{Notice, Operation};
use sdbridge_service::tree::{NodeRow, ToggleOutcome, TreeRow};
use sdbridge_service::{DeviceContext, LocalFile};

#[derive(Debug, Clone, Copy)]
enum MenuAction {
    Refresh,
    Upload,
    DebugLog,
    Quit,
}

impl MenuAction {
    const ALL: [MenuAction; 4] = [Self::Refresh, Self::Upload, Self::DebugLog, Self::Quit];

    fn label(&self) -> &'static str {
        match self {
            Self::Refresh => "[Refresh list]",
            Self::Upload => "[Upload file]",
            Self::DebugLog => "[Show debug log]",
            Self::Quit => "[Quit]",
        }
    }
}

fn input_error(e: dialoguer::Error) -> AppError {
    AppError::internal(format!("Input error: {}", e))
}

/// Execute the browse command
pub async fn execute(ctx: &DeviceContext) -> Result<(), AppError> {
    refresh(ctx).await;

    loop {
        let rows = ctx.tree.rows().await;
        let mut items: Vec<String> = rows.iter().map(output::tree_line).collect();
        items.extend(MenuAction::ALL.iter().map(|a| a.label().to_string()));

        let choice = Select::new()
            .with_prompt(format!("SD card on {}", ctx.transport.base_url()))
            .items(&items)
            .default(0)
            .interact()
            .map_err(input_error)?;

        if let Some(row) = rows.get(choice) {
            tracing::debug!("Selected row {}: {}", choice, output::tree_line(row));
            match row {
                TreeRow::Node(node) if node.toggle.is_some() => toggle(ctx, &node.path).await,
                TreeRow::Node(node) => file_menu(ctx, node).await?,
                TreeRow::Placeholder { .. } => {}
            }
            continue;
        }

        match MenuAction::ALL[choice - rows.len()] {
            MenuAction::Refresh => refresh(ctx).await,
            MenuAction::Upload => upload(ctx).await?,
            MenuAction::DebugLog => output::print_debug_panel(&ctx.debug_log),
            MenuAction::Quit => return Ok(()),
        }
    }
}

async fn refresh(ctx: &DeviceContext) {
    if let Err(e) = ctx.tree.reload().await {
        output::print_notice(&Notice::from_error(Operation::List, &e));
    }
}

async fn toggle(ctx: &DeviceContext, path: &str) {
    match ctx.tree.toggle(path).await {
        Ok(ToggleOutcome::AlreadyLoading) => output::print_warning("Folder is still loading"),
        Ok(_) => {}
        Err(e) => output::print_notice(&Notice::from_error(Operation::Expand, &e)),
    }
}

async fn file_menu(ctx: &DeviceContext, node: &NodeRow) -> Result<(), AppError> {
    let choice = Select::new()
        .with_prompt(format!("{} ({})", node.path, node.size_label))
        .items(&["Download", "Delete", "Back"])
        .default(0)
        .interact()
        .map_err(input_error)?;

    match choice {
        0 => {
            let target: String = Input::new()
                .with_prompt("Save to")
                .default(".".to_string())
                .interact_text()
                .map_err(input_error)?;

            let progress = super::spawn_progress(&ctx.transfers, "Downloading");
            let result = ctx.transfers.download(&node.path).await;
            super::finish_progress(progress);

            match result {
                Ok(file) => match file.save(std::path::Path::new(&target)).await {
                    Ok(written) => {
                        output::print_notice(&Notice::done(Operation::Download));
                        output::print_kv("Saved to", &written.display().to_string());
                    }
                    Err(e) => output::print_error(&e.message),
                },
                Err(e) => output::print_notice(&Notice::from_error(Operation::Download, &e)),
            }
        }
        1 => {
            let confirm = Confirm::new()
                .with_prompt(format!("Delete '{}'?", node.path))
                .default(false)
                .interact()
                .map_err(input_error)?;
            if confirm {
                match ctx.transfers.delete(&node.path).await {
                    Ok(()) => output::print_notice(&Notice::done(Operation::Delete)),
                    Err(e) => output::print_notice(&Notice::from_error(Operation::Delete, &e)),
                }
            }
        }
        _ => {}
    }
    Ok(())
}

async fn upload(ctx: &DeviceContext) -> Result<(), AppError> {
    let path: String = Input::new()
        .with_prompt("Local file")
        .allow_empty(true)
        .interact_text()
        .map_err(input_error)?;

    if path.trim().is_empty() {
        output::print_warning("Please choose a file first");
        return Ok(());
    }

    let file = match LocalFile::read(std::path::Path::new(path.trim())).await {
        Ok(file) => file,
        Err(e) => {
            output::print_error(&e.message);
            return Ok(());
        }
    };

    let progress = super::spawn_progress(&ctx.transfers, "Uploading");
    let result = ctx.transfers.upload(file).await;
    super::finish_progress(progress);

    match result {
        Ok(()) => output::print_notice(&Notice::done(Operation::Upload)),
        Err(e) => output::print_notice(&Notice::from_error(Operation::Upload, &e)),
    }
    Ok(())
}
