//! leadflow-runner: headless command loop for the lead distribution CRM.
//!
//! Usage:
//!   leadflow-runner --db crm.db
//!   leadflow-runner --config crm.json --seed 42
//!
//! Reads one JSON command per line on stdin and writes one JSON reply per
//! line on stdout. Commands are tagged by "type", e.g.
//!   {"type":"create_contact","lead_external_id":"lead-42","source_id":1}

use anyhow::Result;
use leadflow_core::{
    config::CrmConfig,
    error::CrmError,
    model::{AssignmentCreate, ContactCreate, OperatorCreate, SourceCreate},
    service::CrmService,
    types::OperatorId,
};
use serde::Serialize;
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    CreateOperator {
        #[serde(flatten)]
        operator: OperatorCreate,
    },
    ListOperators {
        #[serde(default)]
        skip: u64,
        limit: Option<u64>,
    },
    UpdateOperator {
        operator_id: OperatorId,
        #[serde(flatten)]
        operator: OperatorCreate,
    },
    CreateSource {
        #[serde(flatten)]
        source: SourceCreate,
    },
    ListSources {
        #[serde(default)]
        skip: u64,
        limit: Option<u64>,
    },
    CreateAssignment {
        #[serde(flatten)]
        assignment: AssignmentCreate,
    },
    ListAssignments {
        #[serde(default)]
        skip: u64,
        limit: Option<u64>,
    },
    ListLeads {
        #[serde(default)]
        skip: u64,
        limit: Option<u64>,
    },
    CreateContact {
        #[serde(flatten)]
        contact: ContactCreate,
    },
    ListContacts {
        #[serde(default)]
        skip: u64,
        limit: Option<u64>,
    },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match find_flag(&args, "--config") {
        Some(path) => CrmConfig::load(path)?,
        None => CrmConfig::default(),
    };
    if let Some(db) = find_flag(&args, "--db") {
        config.db_path = db.to_string();
    }
    if let Some(seed) = parse_seed(find_flag(&args, "--seed"))? {
        config.rng_seed = Some(seed);
    }

    log::info!("opening CRM database at {}", config.db_path);
    let mut service = CrmService::build(config)?;
    run_ipc_loop(&mut service)
}

fn run_ipc_loop(service: &mut CrmService) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string(), "status": 400 });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let reply = match cmd {
            IpcCommand::Quit => break,
            other => handle_command(service, other),
        };
        writeln!(stdout, "{}", reply)?;
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(service: &mut CrmService, cmd: IpcCommand) -> serde_json::Value {
    match cmd {
        IpcCommand::CreateOperator { operator } => reply(service.create_operator(operator)),
        IpcCommand::ListOperators { skip, limit } => reply(service.list_operators(skip, limit)),
        IpcCommand::UpdateOperator { operator_id, operator } => {
            reply(service.update_operator(operator_id, operator))
        }
        IpcCommand::CreateSource { source } => reply(service.create_source(source)),
        IpcCommand::ListSources { skip, limit } => reply(service.list_sources(skip, limit)),
        IpcCommand::CreateAssignment { assignment } => {
            reply(service.create_assignment(assignment))
        }
        IpcCommand::ListAssignments { skip, limit } => {
            reply(service.list_assignments(skip, limit))
        }
        IpcCommand::ListLeads { skip, limit } => reply(service.list_leads(skip, limit)),
        IpcCommand::CreateContact { contact } => reply(service.record_contact(contact)),
        IpcCommand::ListContacts { skip, limit } => reply(service.list_contacts(skip, limit)),
        IpcCommand::Quit => serde_json::Value::Null,
    }
}

fn reply<T: Serialize>(result: Result<T, CrmError>) -> serde_json::Value {
    let outcome = result.and_then(|value| serde_json::to_value(value).map_err(CrmError::from));
    match outcome {
        Ok(value) => value,
        Err(e) => {
            let status = status_for(&e);
            if status >= 500 {
                log::error!("command failed: {e}");
            }
            serde_json::json!({ "error": e.to_string(), "status": status })
        }
    }
}

fn status_for(e: &CrmError) -> u16 {
    match e {
        CrmError::NotFound { .. } => 404,
        CrmError::InvalidInput { .. } | CrmError::DuplicateSource { .. } => 400,
        _ => 500,
    }
}

/// A malformed seed is an error, never a silent fallback to entropy.
fn parse_seed(raw: Option<&str>) -> Result<Option<u64>> {
    raw.map(|s| {
        s.parse::<u64>()
            .map_err(|e| anyhow::anyhow!("Invalid --seed {s:?}: {e}"))
    })
    .transpose()
}

fn find_flag<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
