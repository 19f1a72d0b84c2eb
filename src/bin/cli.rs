use anyhow::Context;
use std::env;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};
use waterinfo::config;
use waterinfo::{
    CellEditor, Column, CommitTrigger, DISPLAY_COLUMNS, DeferredLinkOpener, Grid,
    HttpDocumentService, LinkOpener, LogNotifier, RowKey, SaveOutcome, SaveWorkflow,
    SystemLinkOpener,
};

fn parse_column(name: &str) -> Option<Column> {
    serde_json::from_value(serde_json::Value::String(name.to_string())).ok()
}

fn display(grid: &Grid) {
    print!("{:>3}", "#");
    for column in DISPLAY_COLUMNS {
        print!(" | {:<16}", column.data_index());
    }
    println!();
    for row in grid.rows() {
        print!("{:>3}", row.key);
        for column in DISPLAY_COLUMNS {
            let value: String = row.value(column).chars().take(16).collect();
            print!(" | {:<16}", value);
        }
        println!();
    }
}

/// `<key> <column> <value...>`: run one edit through a cell editor.
fn edit(grid: &mut Grid, args: &[&str]) -> String {
    let [key, column, value @ ..] = args else {
        return "usage: <key> <column> <value>".to_string();
    };
    let Some(column) = parse_column(column) else {
        return format!("unknown column {column}");
    };

    let mut editor = match CellEditor::new(RowKey::from(*key), column) {
        Ok(editor) => editor,
        Err(e) => return e.to_string(),
    };
    if let Err(e) = editor.activate(grid) {
        return e.to_string();
    }
    editor.input(value.join(" "));
    match editor.commit(CommitTrigger::Enter, grid) {
        Ok(_) => "ok".to_string(),
        Err(e) => e.to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();

    let args: Vec<String> = env::args().collect();
    let open_links = !args.iter().any(|a| a == "--no-open");

    let settings = config::load_settings();
    let workflow = SaveWorkflow::new(Arc::new(HttpDocumentService::new(
        settings.remote_base_url.clone(),
    )));
    let mut grid = Grid::generate();
    let mut status = String::from("ok");
    let mut show = true;

    loop {
        if show {
            display(&grid);
        }

        print!("({}) > ", status);
        io::stdout().flush().context("flush stdout")?;

        let mut command = String::new();
        if io::stdin().read_line(&mut command)? == 0 {
            break;
        }
        let words: Vec<&str> = command.split_whitespace().collect();

        match words.as_slice() {
            [] => continue,
            ["q"] => break,
            ["disable_output"] => show = false,
            ["enable_output"] => show = true,
            ["reload"] => {
                grid.regenerate();
                status = "ok".to_string();
            }
            ["save"] => {
                let deferred = DeferredLinkOpener::new();
                let opener: &dyn LinkOpener = if open_links { &SystemLinkOpener } else { &deferred };
                let outcome = workflow.save(&grid.snapshot(), &LogNotifier, opener).await;
                status = match outcome {
                    SaveOutcome::Saved { record_id, .. } => format!("saved as {record_id}"),
                    SaveOutcome::Failed(_) => "save failed".to_string(),
                    SaveOutcome::Busy => "busy".to_string(),
                };
                if let Some(link) = deferred.take() {
                    println!("{link}");
                }
            }
            rest => status = edit(&mut grid, rest),
        }
    }

    Ok(())
}
