//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::services::HierarchyService;
use crate::cli::args::{Cli, Commands, ConfigCommands, QueryArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::{list_line, TreeDisplay};
use crate::config::{expand_env_vars, global_config_path, local_config_path, Settings};
use crate::domain::{
    flatten, parse_parent_choice, DepartmentId, DepartmentPatch, DepartmentQuery, NewDepartment,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };

    match command {
        Commands::Config { command } => return config_command(command),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(());
        }
        _ => {}
    }

    let settings = load_settings(cli)?;
    let container = ServiceContainer::new(settings);
    let mut service = container.hierarchy_service();
    service.refresh()?;
    for issue in &service.report().issues {
        output::warning(issue);
    }

    match command {
        Commands::Tree { query } => tree(&service, &to_query(query, &container.settings), query.json),
        Commands::List { query } => list(&service, &to_query(query, &container.settings), query.json),
        Commands::Stats { query } => stats(&service, &to_query(query, &container.settings), query.json),
        Commands::Move {
            dragged,
            target,
            root,
        } => {
            let target = if *root {
                None
            } else {
                parse_parent_choice(target.as_deref())
            };
            move_department(&mut service, dragged, target)
        }
        Commands::Create {
            name,
            description,
            parent,
            manager_id,
            manager_name,
        } => {
            let input = NewDepartment {
                name: name.clone(),
                description: description.clone(),
                parent_id: parse_parent_choice(parent.as_deref()),
                manager_id: manager_id.clone(),
                manager_name: manager_name.clone(),
                company_id: None,
            };
            let created = service.create(input)?;
            output::action("Created", &created);
            Ok(())
        }
        Commands::Update {
            id,
            name,
            description,
            active,
            manager_id,
            manager_name,
        } => {
            let patch = DepartmentPatch {
                name: name.clone(),
                description: description.clone(),
                is_active: *active,
                manager_id: manager_id.clone(),
                manager_name: manager_name.clone(),
            };
            if patch.is_empty() {
                return Err(CliError::Usage("nothing to update".to_string()));
            }
            let updated = service.update(&DepartmentId::from(id.as_str()), patch)?;
            output::action("Updated", &updated);
            Ok(())
        }
        Commands::Delete { id } => {
            let id = DepartmentId::from(id.as_str());
            service.delete(&id)?;
            output::action("Deleted", &id);
            Ok(())
        }
        Commands::Config { .. } | Commands::Completion { .. } => Ok(()),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let settings = apply_cli_overrides(Settings::load(None)?, cli);
    debug!("settings: {:?}", settings);
    Ok(settings)
}

/// Flags win over every config layer; paths are expanded like config values.
fn apply_cli_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(path) = &cli.data_file {
        settings.data_file = PathBuf::from(expand_env_vars(&path.to_string_lossy()));
    }
    if let Some(company) = &cli.company {
        settings.company_id = Some(company.clone());
    }
    settings
}

fn to_query(args: &QueryArgs, settings: &Settings) -> DepartmentQuery {
    DepartmentQuery {
        text: args.query.clone(),
        include_inactive: args.all || settings.include_inactive,
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| InfraError::Serialize {
        context: "render output".to_string(),
        source: e,
    })?;
    output::info(&json);
    Ok(())
}

#[instrument(skip(service))]
fn tree(service: &HierarchyService, query: &DepartmentQuery, json: bool) -> CliResult<()> {
    let visible = service.visible(query);
    if json {
        return print_json(&visible.to_nested());
    }
    if visible.is_empty() {
        output::info("No departments");
        return Ok(());
    }
    for tree in visible.to_tree_strings() {
        output::info(&tree);
    }
    Ok(())
}

#[instrument(skip(service))]
fn list(service: &HierarchyService, query: &DepartmentQuery, json: bool) -> CliResult<()> {
    let departments = flatten(&service.visible(query));
    if json {
        return print_json(&departments);
    }
    for dept in &departments {
        output::info(&list_line(dept));
    }
    Ok(())
}

#[instrument(skip(service))]
fn stats(service: &HierarchyService, query: &DepartmentQuery, json: bool) -> CliResult<()> {
    let stats = service.stats(query);
    if json {
        return print_json(&stats);
    }
    output::header("Departments");
    output::info(&stats);
    Ok(())
}

#[instrument(skip(service))]
fn move_department(
    service: &mut HierarchyService,
    dragged: &str,
    target: Option<DepartmentId>,
) -> CliResult<()> {
    let dragged = DepartmentId::from(dragged);
    service.move_department(&dragged, target.as_ref())?;
    let destination = target
        .map(|t| t.to_string())
        .unwrap_or_else(|| "root".to_string());
    output::success(&format!("Moved {dragged} -> {destination}"));
    Ok(())
}

fn config_command(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(None)?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::info("global: (no config directory)"),
            }
            output::info(&format!("local:  {}", local_config_path(Path::new(".")).display()));
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                local_config_path(Path::new("."))
            };
            if path.exists() {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn given_tilde_in_data_file_flag_when_applying_overrides_then_expanded() {
        let cli = Cli::try_parse_from([
            "deptree",
            "-f",
            "~/org/departments.json",
            "-c",
            "acme",
            "tree",
        ])
        .expect("parse args");

        let settings = apply_cli_overrides(Settings::default(), &cli);

        let home = std::env::var("HOME").expect("HOME should be set");
        let path = settings.data_file.to_string_lossy().into_owned();
        assert!(path.starts_with(&home), "should start with home: {}", path);
        assert!(path.ends_with("org/departments.json"));
        assert_eq!(settings.company_id.as_deref(), Some("acme"));
    }

    #[test]
    fn given_no_flags_when_applying_overrides_then_settings_unchanged() {
        let cli = Cli::try_parse_from(["deptree", "list"]).expect("parse args");
        let settings = Settings {
            data_file: PathBuf::from("/srv/departments.json"),
            ..Settings::default()
        };

        assert_eq!(apply_cli_overrides(settings.clone(), &cli), settings);
    }
}
