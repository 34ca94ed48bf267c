// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subcommand implementations.

use crate::cli::{CompileArgs, GraphArgs, RunArgs, StepAction};
use anyhow::{bail, Context, Result};
use nodelogic_graph::{Blueprint, ComponentId, EngineConfig, Graph, GraphDescription, LogicEngine};
use std::collections::HashMap;
use std::path::Path;

/// Compile a blueprint and write the two graph documents
pub fn compile_main(args: CompileArgs) -> Result<()> {
    let blueprint = Blueprint::load(&args.blueprint)?;
    let graph = blueprint
        .compile()
        .with_context(|| format!("Failed to compile {:?}", args.blueprint))?;

    for issue in graph.wiring_issues() {
        tracing::warn!("{}", issue);
    }
    if let Some(on_cycle) = graph.find_cycle() {
        tracing::warn!(
            "Feedback loop through {}; propagation into it stops with an error at the configured depth limit, or never ends if the limit is 0",
            on_cycle
        );
    }

    let dir = args
        .out_dir
        .or_else(|| args.blueprint.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let stem = match args.stem {
        Some(stem) => stem,
        None => args
            .blueprint
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .context("Blueprint path has no file name")?,
    };

    GraphDescription::from_graph(&graph)?.write_to(&dir, &stem)?;
    println!(
        "Compiled {} components ({} inputs, {} outputs) into {:?}",
        graph.len(),
        graph.input_names().len(),
        graph.output_names().len(),
        GraphDescription::components_path(&dir, &stem)
    );
    Ok(())
}

/// Simulate a compiled graph
pub fn run_main(args: RunArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let graph = load_graph(&args.graph)?;

    let labels: HashMap<ComponentId, String> = graph
        .names()
        .map(|(name, id)| (id.clone(), name.to_string()))
        .collect();
    let json = args.json;

    let mut engine = LogicEngine::new(config);
    tracing::debug!("Engine configuration: {:?}", engine.config());
    engine.initialize_with_graph(graph, move |id, state| {
        let label = labels.get(id).map_or(id.as_str(), String::as_str);
        if json {
            println!("{}", serde_json::json!({ "output": label, "id": id.as_str(), "state": state }));
        } else {
            println!("{label} -> {}", u8::from(state));
        }
    });

    for step in &args.steps {
        match step.action {
            StepAction::Set(value) => {
                let id = engine.resolve_id(&step.name)?.clone();
                engine
                    .set_input(id.as_str(), value)
                    .with_context(|| format!("Failed to set {}", step.name))?;
            }
            StepAction::Toggle => {
                engine
                    .toggle_input(&step.name)
                    .with_context(|| format!("Failed to toggle {}", step.name))?;
            }
        }
    }

    if !json {
        for name in engine.output_names()? {
            let id = engine.resolve_id(name)?;
            println!("{name} = {}", u8::from(engine.get_output(id.as_str())?));
        }
    }
    Ok(())
}

/// Report structural problems in a compiled graph
pub fn check_main(args: GraphArgs) -> Result<()> {
    let graph = load_graph(&args)?;

    let issues = graph.wiring_issues();
    for issue in &issues {
        println!("{issue}");
    }
    let cycle = graph.find_cycle();
    if let Some(on_cycle) = &cycle {
        println!("feedback loop through {on_cycle}");
    }

    if !issues.is_empty() || cycle.is_some() {
        bail!("{} wiring issue(s) found in {:?}", issues.len() + usize::from(cycle.is_some()), args.stem);
    }
    println!(
        "{}: {} components, inputs [{}], outputs [{}]",
        args.stem,
        graph.len(),
        graph.input_names().join(", "),
        graph.output_names().join(", ")
    );
    Ok(())
}

fn load_graph(args: &GraphArgs) -> Result<Graph> {
    let description = GraphDescription::from_stem(&args.dir, &args.stem)?;
    description
        .parse()
        .with_context(|| format!("Failed to load graph {:?}", args.stem))
}
