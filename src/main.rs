use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::json;

use chatflow_config::{PersistenceConfig, Position, TEXT_MESSAGE};
use chatflow_editor::FlowEditor;
use chatflow_persistence::FlowPersistence;
use chatflow_store::{FileStorage, Storage};
use chatflow_workflow::ValidationReport;

/// Chatflow - build linear chatbot message flows
#[derive(Parser)]
#[command(name = "chatflow")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.chatflow)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Path to a JSON persistence config (storage keys, auto-save delay)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Add a message node to the draft
  AddNode {
    /// Node type
    #[arg(long = "type", default_value = TEXT_MESSAGE)]
    node_type: String,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    x: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    y: f64,

    /// Message text
    #[arg(long)]
    label: Option<String>,
  },

  /// Connect one node's output to another node's input
  Connect { source: String, target: String },

  /// Change a node's message text
  SetLabel { node: String, text: String },

  /// Remove a node and its connections
  RemoveNode { node: String },

  /// Remove a connection
  RemoveEdge { edge: String },

  /// Check whether the draft can be saved
  Validate {
    /// Print the result as JSON
    #[arg(long)]
    json: bool,
  },

  /// Print the draft
  Show,

  /// Save the draft as a named flow and clear it
  Save {
    /// Flow name (default: "Flow <n>")
    name: Option<String>,
  },

  /// List saved flows
  List,

  /// Replace the draft with a saved flow
  Load { id: String },

  /// Delete a saved flow
  Delete { id: String },

  /// Empty the draft
  Clear,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let Some(command) = cli.command else {
    println!("chatflow - use --help to see available commands");
    return Ok(());
  };

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".chatflow"),
  };
  let config = load_config(cli.config.as_deref())?;

  let rt = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()?;
  rt.block_on(async { run(command, data_dir, config).await })
}

fn load_config(path: Option<&Path>) -> Result<PersistenceConfig> {
  let Some(path) = path else {
    return Ok(PersistenceConfig::default());
  };

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read config file: {}", path.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse config file: {}", path.display()))
}

async fn run(command: Commands, data_dir: PathBuf, config: PersistenceConfig) -> Result<()> {
  let backend = FileStorage::open(&data_dir)
    .with_context(|| format!("failed to open data directory: {}", data_dir.display()))?;
  let storage = Storage::new(backend);
  let persistence = FlowPersistence::new(storage.context(), &config);

  let mut editor = FlowEditor::new(persistence);
  editor.restore_draft();

  match command {
    Commands::AddNode {
      node_type,
      x,
      y,
      label,
    } => {
      let node = editor
        .drop_node(&node_type, Some(Position::new(x, y)))
        .context("node type must not be empty")?;
      if let Some(label) = label {
        editor.set_label(&node.id, &label)?;
      }
      let node = editor.node(&node.id).cloned().unwrap_or(node);
      eprintln!("Added node: {}", node.id);
      println!("{}", serde_json::to_string_pretty(&node)?);
    }
    Commands::Connect { source, target } => {
      let edge = editor.connect(&source, &target)?;
      eprintln!("Connected {} -> {}", edge.source, edge.target);
      println!("{}", serde_json::to_string_pretty(&edge)?);
    }
    Commands::SetLabel { node, text } => {
      editor.set_label(&node, &text)?;
      eprintln!("Updated node: {}", node);
    }
    Commands::RemoveNode { node } => {
      if !editor.remove_node(&node) {
        bail!("node '{}' not found in draft", node);
      }
      eprintln!("Removed node: {}", node);
    }
    Commands::RemoveEdge { edge } => {
      if !editor.remove_edge(&edge) {
        bail!("edge '{}' not found in draft", edge);
      }
      eprintln!("Removed edge: {}", edge);
    }
    Commands::Validate { json } => {
      let report = ValidationReport::check(editor.nodes(), editor.edges());
      if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
      } else if report.is_valid {
        println!("Flow is valid");
      }
      if let Some(error) = report.error {
        bail!(error);
      }
    }
    Commands::Show => {
      let output = json!({
        "nodes": editor.nodes(),
        "edges": editor.edges(),
        "lastSaved": editor.persistence().current_flow_state().last_saved,
      });
      println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Commands::Save { name } => {
      let name = name.unwrap_or_else(|| editor.default_flow_name());
      let flow = editor
        .save(Some(name.as_str()))?
        .context("flow name must not be blank")?;
      editor.persistence_mut().discard_draft();
      eprintln!("Flow saved successfully: {} ({})", flow.name, flow.id);
      println!("{}", serde_json::to_string_pretty(&flow)?);
    }
    Commands::List => {
      let flows: Vec<_> = editor
        .persistence()
        .saved_flows()
        .into_iter()
        .map(|flow| {
          json!({
            "id": flow.id,
            "name": flow.name,
            "nodes": flow.nodes.len(),
            "edges": flow.edges.len(),
            "timestamp": flow.timestamp,
          })
        })
        .collect();
      if flows.is_empty() {
        eprintln!("No saved flows yet");
      }
      println!("{}", serde_json::to_string_pretty(&flows)?);
    }
    Commands::Load { id } => {
      let flow = editor.load_flow(&id).await?;
      eprintln!("Loaded flow: {}", flow.name);
    }
    Commands::Delete { id } => {
      if !editor.delete_flow(&id) {
        bail!("saved flow '{}' not found", id);
      }
      eprintln!("Flow deleted");
    }
    Commands::Clear => {
      editor.clear();
      editor.persistence_mut().discard_draft();
      eprintln!("Draft cleared");
    }
  }

  editor.persistence_mut().flush();
  Ok(())
}
