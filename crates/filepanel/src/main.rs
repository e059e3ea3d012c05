use anyhow::{Context, Result as AnyhowResult};
use clap::Parser;
use filepanel::services::fs::{FsManager, LocalFsBackend};
use filepanel::services::tracing_setup;
use filepanel::view::ui::{buffer_to_lines, FileExplorerRenderer};
use filepanel::{FileTreePanel, PanelServices, SettingsStore};
use filepanel_core::TreeSettings;
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use std::path::PathBuf;
use std::sync::Arc;

/// Print the files panel for a directory
#[derive(Parser, Debug)]
#[command(name = "filepanel")]
#[command(about = "Render a lazily listed file tree for a directory", long_about = None)]
#[command(version)]
struct Args {
    /// Directory to open (defaults to the current directory)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Settings file (JSON `tree` object)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Override `showHidden`
    #[arg(long, value_name = "BOOL")]
    show_hidden: Option<bool>,

    /// Override `showDotGit`
    #[arg(long, value_name = "BOOL")]
    show_dot_git: Option<bool>,

    /// Expand down to this path, relative to PATH (repeatable)
    #[arg(long, value_name = "REL")]
    expand: Vec<PathBuf>,

    /// Panel width in columns
    #[arg(long, value_name = "N", default_value_t = 40)]
    width: u16,

    /// Log file (defaults to filepanel.log in the temp directory)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Locale for labels and messages (e.g. en, zh-CN)
    #[arg(long, value_name = "LOCALE")]
    locale: Option<String>,

    /// Print the settings JSON Schema and exit
    #[arg(long)]
    print_schema: bool,
}

fn load_settings(args: &Args) -> AnyhowResult<TreeSettings> {
    let mut settings = match &args.settings {
        Some(path) => TreeSettings::load_from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => TreeSettings::default(),
    };
    if let Some(show_hidden) = args.show_hidden {
        settings.show_hidden = show_hidden;
    }
    if let Some(show_dot_git) = args.show_dot_git {
        settings.show_dot_git = show_dot_git;
    }
    Ok(settings)
}

async fn render_panel(args: &Args) -> AnyhowResult<Vec<String>> {
    let root = match &args.path {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    let root = tokio::fs::canonicalize(&root)
        .await
        .with_context(|| format!("Failed to resolve {}", root.display()))?;

    let settings = SettingsStore::new(load_settings(args)?);
    let fs = FsManager::new(Arc::new(LocalFsBackend::new()));
    let mut panel = FileTreePanel::open(root.clone(), fs, settings, PanelServices::default())
        .await
        .with_context(|| format!("Failed to open {}", root.display()))?;

    for relative in &args.expand {
        let target = root.join(relative);
        let Some(id) = panel.tree_mut().expand_to_path(&target).await else {
            tracing::warn!("Could not expand to {:?}", target);
            continue;
        };
        if panel.tree().node(id).is_some_and(|node| node.is_dir()) {
            if let Err(e) = panel.tree_mut().expand(id).await {
                tracing::warn!("Could not expand {:?}: {}", target, e);
            }
        }
    }
    panel.settle().await;

    let rows = panel.render();
    let toolbar = panel.toolbar();
    let height = rows.len() + 2 + usize::from(!toolbar.is_empty());
    let height = u16::try_from(height).unwrap_or(u16::MAX);

    let mut terminal = Terminal::new(TestBackend::new(args.width, height))?;
    terminal.draw(|frame| {
        let area = frame.area();
        FileExplorerRenderer::render(&rows, &toolbar, panel.status_message(), frame, area);
    })?;
    Ok(buffer_to_lines(terminal.backend().buffer()))
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    if let Some(locale) = &args.locale {
        rust_i18n::set_locale(locale);
    }

    // Handle --print-schema early (no filesystem access needed)
    if args.print_schema {
        let schema = TreeSettings::json_schema()?;
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("filepanel.log"));
    if !tracing_setup::init_global(&log_file) {
        eprintln!("Warning: could not log to {}", log_file.display());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    for line in runtime.block_on(render_panel(&args))? {
        println!("{}", line);
    }
    Ok(())
}
