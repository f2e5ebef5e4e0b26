use clap::{Parser, Subcommand};
use std::path::PathBuf;

use lopt_solver::{BranchAndBound, SolutionStatus, Solver};

#[derive(Parser)]
#[command(name = "lopt")]
#[command(about = "A modeling language and solver for LP/MILP problems", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a .lp model file and output the AST
    Parse {
        /// The file to parse
        file: PathBuf,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Solve a model and output the optimal solution
    Solve {
        /// The file containing the model
        file: PathBuf,
        /// Solve the LP relaxation even when the model has integer variables
        #[arg(long)]
        relaxation: bool,
        /// Emit the result as JSON
        #[arg(long)]
        json: bool,
        /// Cap on branch-and-bound node expansions
        #[arg(long, default_value_t = 100)]
        max_expansions: usize,
    },
    /// Check a model file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { file, format } => {
            let model = parse_file(&file);
            if format == "json" {
                match serde_json::to_string_pretty(&model) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing AST: {}", e);
                        std::process::exit(1);
                    }
                }
            } else {
                println!("{:#?}", model);
            }
        }
        Commands::Solve {
            file,
            relaxation,
            json,
            max_expansions,
        } => {
            let compiled = compile_file(&file);

            if compiled.is_mixed_integer() && !relaxation {
                let driver = BranchAndBound::new().with_max_expansions(max_expansions);
                let solution = match driver.solve(&compiled.problem) {
                    Ok(s) => s,
                    Err(e) => {
                        eprintln!("Solve error: {}", e);
                        std::process::exit(1);
                    }
                };

                if json {
                    print_json(
                        &compiled.variables,
                        solution.status,
                        &solution.values,
                        solution.objective_value,
                        serde_json::json!({
                            "nodes_explored": solution.nodes_explored,
                            "certified": solution.certified,
                        }),
                    );
                } else {
                    report_status(solution.status);
                    if solution.status == SolutionStatus::Optimal {
                        println!("Objective: {:.6}", solution.objective_value);
                        print_values(&compiled.variables, &solution.values);
                        println!();
                        println!("Nodes explored: {}", solution.nodes_explored);
                        if !solution.certified {
                            println!(
                                "Warning: expansion cap reached; best solution found, \
                                 optimality not proven"
                            );
                        }
                    }
                }
                exit_for(solution.status);
            } else {
                let solution = match Solver::new().solve(compiled.lp()) {
                    Ok(s) => s,
                    Err(e) => {
                        eprintln!("Solve error: {}", e);
                        std::process::exit(1);
                    }
                };

                if json {
                    print_json(
                        &compiled.variables,
                        solution.status,
                        &solution.values,
                        solution.objective_value,
                        serde_json::json!({
                            "iterations": solution.iterations,
                            "multiple_optima": solution.multiple_optima,
                        }),
                    );
                } else {
                    report_status(solution.status);
                    if solution.status == SolutionStatus::Optimal {
                        println!("Objective: {:.6}", solution.objective_value);
                        print_values(&compiled.variables, &solution.values);
                        println!();
                        println!("Iterations: {}", solution.iterations);
                        if solution.multiple_optima {
                            println!("Note: other optimal solutions exist");
                        }
                    }
                }
                exit_for(solution.status);
            }
        }
        Commands::Check { file } => {
            let compiled = compile_file(&file);
            let integers = compiled
                .problem
                .integers
                .iter()
                .filter(|&&b| b)
                .count();

            println!("OK {} is valid", file.display());
            println!("  {} variables ({} integer)", compiled.variables.len(), integers);
            println!("  {} constraints", compiled.lp().num_constraints());
        }
    }
}

fn parse_file(file: &PathBuf) -> lopt_lang::Model {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };

    match lopt_lang::Parser::parse(&source) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    }
}

fn compile_file(file: &PathBuf) -> lopt_lang::CompiledModel {
    let model = parse_file(file);
    match lopt_lang::Compiler::new().compile(&model) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("Compile error: {}", e);
            std::process::exit(1);
        }
    }
}

fn report_status(status: SolutionStatus) {
    match status {
        SolutionStatus::Optimal => println!("Status: OPTIMAL"),
        SolutionStatus::Infeasible => {
            println!("Status: INFEASIBLE");
            println!("No solution exists that satisfies all constraints.");
        }
        SolutionStatus::Unbounded => {
            println!("Status: UNBOUNDED");
            println!("The objective can be improved without limit.");
        }
    }
}

fn print_values(names: &[String], values: &[f64]) {
    println!();
    println!("Variables:");
    for (name, value) in names.iter().zip(values.iter()) {
        println!("  {:20} {:12.6}", name, value);
    }
}

fn print_json(
    names: &[String],
    status: SolutionStatus,
    values: &[f64],
    objective: f64,
    extra: serde_json::Value,
) {
    let status = match status {
        SolutionStatus::Optimal => "optimal",
        SolutionStatus::Infeasible => "infeasible",
        SolutionStatus::Unbounded => "unbounded",
    };
    let variables: serde_json::Map<String, serde_json::Value> = names
        .iter()
        .zip(values.iter())
        .map(|(n, &v)| (n.clone(), serde_json::json!(v)))
        .collect();

    let mut out = serde_json::json!({
        "status": status,
        "objective": objective,
        "variables": variables,
    });
    if let (Some(obj), Some(extra)) = (out.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            obj.insert(k.clone(), v.clone());
        }
    }
    println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
}

fn exit_for(status: SolutionStatus) {
    if status != SolutionStatus::Optimal {
        std::process::exit(1);
    }
}
