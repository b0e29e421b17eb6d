use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for psrx-cpu")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci {
        #[arg(long)]
        verbose: bool,
    },
    /// Quick checks before commit (fmt, clippy)
    Check {
        #[arg(long)]
        verbose: bool,
    },
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Build the project
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run tests
    Test {
        #[arg(long)]
        doc: bool,
        #[arg(long)]
        ignored: bool,
        /// Run only CPU module tests
        #[arg(long)]
        cpu: bool,
        /// Run only memory bus tests
        #[arg(long)]
        memory: bool,
        /// Run only the integration tests under tests/
        #[arg(long)]
        integration: bool,
    },
    /// Run benchmarks
    Bench,
    /// Run an image through the psrx-cpu runner
    Run {
        /// Raw image to execute (defaults to SCPH1001.BIN)
        #[arg(default_value = "SCPH1001.BIN")]
        image: String,
        /// Number of instructions to execute
        #[arg(short = 'n', long, default_value = "100000")]
        steps: u64,
        /// Write an instruction trace to this file
        #[arg(long)]
        trace: Option<String>,
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Pre-commit hook (fmt, clippy, test)
    PreCommit,
    /// Install git hooks
    InstallHooks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { verbose } => run_ci(verbose),
        Commands::Check { verbose } => run_check(verbose),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy { fix } => run_clippy(fix),
        Commands::Build { release } => run_build(release),
        Commands::Test {
            doc,
            ignored,
            cpu,
            memory,
            integration,
        } => run_test(
            doc,
            ignored,
            TestSelection {
                cpu,
                memory,
                integration,
            },
        ),
        Commands::Bench => run_bench(),
        Commands::Run {
            image,
            steps,
            trace,
            release,
        } => run_image(&image, steps, trace.as_deref(), release),
        Commands::PreCommit => run_pre_commit(),
        Commands::InstallHooks => install_hooks(),
    }
}

/// Test groups picked on the command line; none selected means everything
#[derive(Default, Clone, Copy)]
struct TestSelection {
    cpu: bool,
    memory: bool,
    integration: bool,
}

impl TestSelection {
    fn count(self) -> usize {
        [self.cpu, self.memory, self.integration]
            .iter()
            .filter(|&&f| f)
            .count()
    }
}

fn run_ci(verbose: bool) -> Result<()> {
    println!("{}", "=== Running CI Pipeline ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;
    run_task("Build", || run_build(false), verbose)?;
    run_task(
        "Test",
        || run_test(false, false, TestSelection::default()),
        verbose,
    )?;

    report_elapsed("✓ CI passed in", start);
    Ok(())
}

fn run_check(verbose: bool) -> Result<()> {
    println!("{}", "=== Running Quick Checks ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;

    report_elapsed("✓ Checks passed in", start);
    Ok(())
}

fn run_fmt(check: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("fmt").arg("--all");

    if check {
        cmd.arg("--").arg("--check");
    }

    execute_command(&mut cmd)
}

fn run_clippy(fix: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("clippy").arg("--workspace").arg("--all-targets");

    if fix {
        cmd.arg("--fix");
    } else {
        cmd.arg("--").arg("-D").arg("warnings");
    }

    execute_command(&mut cmd)
}

fn run_build(release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("build").arg("--workspace");

    if release {
        cmd.arg("--release");
    }

    execute_command(&mut cmd)
}

fn run_test(doc: bool, ignored: bool, selection: TestSelection) -> Result<()> {
    let mut runs: Vec<(&str, Vec<&str>)> = Vec::new();

    if doc {
        runs.push(("Doc", vec!["--doc"]));
    } else if selection.count() == 0 {
        runs.push(("All", vec![]));
    } else {
        if selection.cpu {
            runs.push(("CPU", vec!["--lib", "core::cpu"]));
        }
        if selection.memory {
            runs.push(("Memory", vec!["--lib", "core::memory"]));
        }
        if selection.integration {
            runs.push(("Integration", vec!["--test", "integration_test"]));
        }
    }

    let single = runs.len() == 1;
    let mut all_success = true;

    for (name, args) in runs {
        if !single {
            println!("{} Running {} tests...", "→".blue(), name.bold());
        }

        let mut cmd = Command::new("cargo");
        cmd.arg("test").args(&args);

        if ignored {
            cmd.arg("--").arg("--ignored");
        }

        match execute_command(&mut cmd) {
            Ok(_) if !single => println!("{} {} tests passed\n", "✓".green(), name),
            Ok(_) => {}
            Err(e) if single => return Err(e),
            Err(_) => {
                println!("{} {} tests failed\n", "✗".red(), name);
                all_success = false;
            }
        }
    }

    if all_success {
        Ok(())
    } else {
        anyhow::bail!("Some test groups failed")
    }
}

fn run_bench() -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("bench").arg("--bench").arg("cpu_bench");

    execute_command(&mut cmd)
}

fn run_image(image: &str, steps: u64, trace: Option<&str>, release: bool) -> Result<()> {
    println!("{}", "=== psrx-cpu Run ===".bold().blue());

    if !Path::new(image).exists() {
        println!("{} Image not found: {}", "✗".red().bold(), image.yellow());
        println!(
            "\n{} Pass a raw image path, e.g. a BIOS dump such as SCPH1001.BIN.",
            "ℹ".blue()
        );
        anyhow::bail!("Image not found");
    }

    println!("{} Image: {}", "✓".green(), image.cyan());
    println!("{} Steps: {}", "→".blue(), steps.to_string().bold());
    if let Some(path) = trace {
        println!("{} Trace: {}", "→".blue(), path.cyan());
    }
    println!(
        "{} Build mode: {}",
        "→".blue(),
        if release {
            "release".green().bold()
        } else {
            "debug".yellow().bold()
        }
    );
    println!();

    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    cmd.arg("run").arg("--bin").arg("psrx-cpu");

    if release {
        cmd.arg("--release");
    }

    cmd.arg("--").arg(image).arg("-n").arg(steps.to_string());

    if let Some(path) = trace {
        cmd.arg("--trace").arg(path);
    }

    if let Err(e) = execute_command(&mut cmd) {
        println!("\n{} Run failed", "✗".red().bold());
        return Err(e);
    }

    report_elapsed("✓ Run completed in", start);
    Ok(())
}

fn run_pre_commit() -> Result<()> {
    println!("{}", "=== Pre-commit Checks ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), false)?;
    run_task("Clippy", || run_clippy(false), false)?;
    run_task(
        "Test",
        || run_test(false, false, TestSelection::default()),
        false,
    )?;

    report_elapsed("✓ Pre-commit checks passed in", start);
    Ok(())
}

fn install_hooks() -> Result<()> {
    use std::fs;

    println!("{}", "Installing git hooks...".bold());

    let hook_content = r#"#!/bin/sh
# Auto-generated by cargo run -p xtask -- install-hooks
set -e

echo "Running pre-commit checks..."
cargo run --quiet --package xtask -- pre-commit
"#;

    let hook_path = ".git/hooks/pre-commit";
    fs::write(hook_path, hook_content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = fs::metadata(hook_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(hook_path, perms)?;
    }

    println!("{}", "✓ Git hooks installed".green());
    println!("  Pre-commit hook will run: fmt, clippy, test");

    Ok(())
}

fn run_task<F>(name: &str, task: F, verbose: bool) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    print!("{} {} ... ", "→".blue(), name);

    let start = Instant::now();

    match task() {
        Ok(_) => {
            let elapsed = start.elapsed();
            println!(
                "{} {}",
                "✓".green().bold(),
                if verbose {
                    format!("({:.2}s)", elapsed.as_secs_f64())
                } else {
                    String::new()
                }
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗".red().bold());
            Err(e)
        }
    }
}

fn report_elapsed(label: &str, start: Instant) {
    println!(
        "\n{} {}",
        label.green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );
}

fn execute_command(cmd: &mut Command) -> Result<()> {
    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("Command failed with exit code: {}", status);
    }

    Ok(())
}
