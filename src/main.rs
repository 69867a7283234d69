// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! sld-designer CLI entrypoint.
//!
//! Loads an SCL document, runs one diagram gesture against it and prints the emitted edit
//! batches as JSON. `--write` saves the edited document back in place.

use std::error::Error;
use std::fs;

use log::{debug, info};
use sld_designer::designer::{instantiate, Designer, DesignerConfig, EquipmentType, Template};
use sld_designer::layout::{ConnectRequest, Point};
use sld_designer::model::{Document, NodeId};
use sld_designer::ops::{EditBatch, History};
use sld_designer::query::find_by_name_path;
use sld_designer::store::{DocumentFile, WriteDurability};
use smallvec::SmallVec;
use smol_str::SmolStr;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} <file.scd> place <element-path|+template> <parent-path> <x> <y> [options]\n  {program} <file.scd> connect <from-path> <from-terminal> <to-path> [<to-terminal>] <x,y>... [options]\n  {program} <file.scd> rotate <element-path> [options]\n  {program} <file.scd> add-substation [options]\n\nOptions:\n  --write             save the edited document in place\n  --config <file>     JSON designer configuration\n  --durable-writes    sync the saved file and its directory where supported\n\nElement paths join `name` attributes below the root, e.g. `S1/V1/B1/QA1`.\nTemplates: +bay, +voltage-level, +bus-bar or +<equipment type> (e.g. +CBR)."
    );
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Place {
        element: String,
        parent: String,
        x: f64,
        y: f64,
    },
    Connect {
        from: String,
        from_terminal: String,
        to: String,
        to_terminal: Option<String>,
        path: Vec<Point>,
    },
    Rotate {
        element: String,
    },
    AddSubstation,
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    file: String,
    command: Command,
    write: bool,
    config: Option<String>,
    durable_writes: bool,
}

fn parse_point(raw: &str) -> Result<Point, ()> {
    let (x, y) = raw.split_once(',').ok_or(())?;
    Ok(Point::new(
        x.trim().parse().map_err(|_| ())?,
        y.trim().parse().map_err(|_| ())?,
    ))
}

fn parse_command(positional: Vec<String>) -> Result<Command, ()> {
    let mut args = positional.into_iter();
    let name = args.next().ok_or(())?;
    let rest = args.collect::<Vec<_>>();
    match (name.as_str(), rest.as_slice()) {
        ("place", [element, parent, x, y]) => Ok(Command::Place {
            element: element.clone(),
            parent: parent.clone(),
            x: x.parse().map_err(|_| ())?,
            y: y.parse().map_err(|_| ())?,
        }),
        ("connect", [from, from_terminal, to, tail @ ..]) => {
            let (to_terminal, points) = match tail.split_first() {
                Some((first, points)) if !first.contains(',') => (Some(first.clone()), points),
                _ => (None, tail),
            };
            if points.is_empty() {
                return Err(());
            }
            let path = points
                .iter()
                .map(|raw| parse_point(raw))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Command::Connect {
                from: from.clone(),
                from_terminal: from_terminal.clone(),
                to: to.clone(),
                to_terminal,
                path,
            })
        }
        ("rotate", [element]) => Ok(Command::Rotate {
            element: element.clone(),
        }),
        ("add-substation", []) => Ok(Command::AddSubstation),
        _ => Err(()),
    }
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut positional = Vec::new();
    let mut write = false;
    let mut config = None;
    let mut durable_writes = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--write" => {
                if write {
                    return Err(());
                }
                write = true;
            }
            "--config" => {
                if config.is_some() {
                    return Err(());
                }
                config = Some(args.next().ok_or(())?);
            }
            "--durable-writes" => {
                if durable_writes {
                    return Err(());
                }
                durable_writes = true;
            }
            // Negative coordinates are positional.
            _ if arg.starts_with("--") => return Err(()),
            _ => positional.push(arg),
        }
    }

    if positional.is_empty() {
        return Err(());
    }
    let file = positional.remove(0);
    let command = parse_command(positional)?;

    if durable_writes && !write {
        return Err(());
    }

    Ok(CliOptions {
        file,
        command,
        write,
        config,
        durable_writes,
    })
}

fn resolve(doc: &Document, path: &str) -> Result<NodeId, Box<dyn Error>> {
    find_by_name_path(doc, path).ok_or_else(|| format!("no element at path `{path}`").into())
}

fn template(name: &str) -> Result<Template, Box<dyn Error>> {
    Ok(match name {
        "bay" => Template::Bay,
        "voltage-level" => Template::VoltageLevel,
        "bus-bar" => Template::BusBar,
        code => Template::Equipment(code.parse::<EquipmentType>()?),
    })
}

fn run(
    doc: &mut Document,
    designer: &mut Designer,
    command: Command,
) -> Result<Vec<EditBatch>, Box<dyn Error>> {
    let mut history = History::new();
    let batches = match command {
        Command::Place {
            element,
            parent,
            x,
            y,
        } => {
            let element = match element.strip_prefix('+') {
                Some(name) => instantiate(doc, template(name)?),
                None => resolve(doc, &element)?,
            };
            let parent = resolve(doc, &parent)?;
            designer.place(doc, &mut history, element, parent, Point::new(x, y))?
        }
        Command::Connect {
            from,
            from_terminal,
            to,
            to_terminal,
            path,
        } => {
            let request = ConnectRequest {
                from: resolve(doc, &from)?,
                from_terminal: SmolStr::new(from_terminal),
                to: resolve(doc, &to)?,
                to_terminal: to_terminal.map(SmolStr::new),
                path: SmallVec::from_vec(path),
            };
            vec![designer.connect(doc, &mut history, &request)?]
        }
        Command::Rotate { element } => {
            let element = resolve(doc, &element)?;
            vec![designer.rotate(doc, &mut history, element)?]
        }
        Command::AddSubstation => {
            let substation = designer.insert_substation(doc, &mut history)?;
            debug!(substation:?; "inserted substation");
            Vec::new()
        }
    };
    Ok(batches)
}

fn main() {
    env_logger::init();

    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "sld-designer".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let config = match &options.config {
            Some(path) => serde_json::from_str::<DesignerConfig>(&fs::read_to_string(path)?)?,
            None => DesignerConfig::default(),
        };
        let file = if options.durable_writes {
            DocumentFile::new(&options.file).with_durability(WriteDurability::Durable)
        } else {
            DocumentFile::new(&options.file)
        };

        let mut doc = file.load()?;
        let mut designer = Designer::new(config);
        designer.open(&mut doc);
        let rev = doc.rev();

        let batches = run(&mut doc, &mut designer, options.command)?;
        println!("{}", serde_json::to_string_pretty(&batches)?);

        if options.write && doc.rev() != rev {
            file.save(&doc)?;
            info!(path = options.file.as_str(), rev = doc.rev(); "wrote document");
        }
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
