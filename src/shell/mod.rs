pub mod command;
pub mod config;
pub mod parse;

use crate::shell::{
    command::{execute_command, Command, Session},
    config::ShellConfig,
    parse::{parse_command, COMMANDS},
};
use colored::*;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal,
};
use std::io::stdout;

pub fn start_shell(config: ShellConfig) {
    boot_screen(&config);

    let username = whoami::username();
    let hostname = whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string());

    println!(
        "{}",
        "Type 'help' for available commands. Use ↑↓ for history.\n".bright_black()
    );

    let mut line_editor = Reedline::create();
    match FileBackedHistory::with_file(config.history_size, config.history_path.clone()) {
        Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
        Err(e) => log::warn!("history disabled: {}", e),
    }

    // 命令补全
    let commands = COMMANDS.iter().map(|c| c.to_string()).collect();
    let completer = DefaultCompleter::new_with_wordlen(commands, 2);
    line_editor = line_editor.with_completer(Box::new(completer));

    let mut session = Session::new(config);

    loop {
        let left = format!(
            "{}:{}",
            format!("{}@{}", username, hostname).green(),
            session.current_dir.blue()
        );
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(left),
            DefaultPromptSegment::Basic("MiniFS".bright_blue().bold().to_string()),
        );

        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(buffer)) => {
                let trimmed = buffer.trim();
                if trimmed.is_empty() {
                    continue;
                }

                match parse_command(trimmed) {
                    Some(cmd) => {
                        if let Err(e) = execute_command(&cmd, &mut session) {
                            println!("{} {}", "❌ Error:".red().bold(), e);
                        }
                        if matches!(cmd, Command::Exit) {
                            println!("{}", "👋 Bye!".bright_yellow());
                            break;
                        }
                    }
                    None => println!(
                        "{}",
                        "⚠️  Unknown command or bad arguments. Type 'help' for command list."
                            .yellow()
                    ),
                }
            }
            Ok(Signal::CtrlC) => {
                println!();
                continue;
            }
            Ok(Signal::CtrlD) => {
                println!("{}", "Exiting MiniFS...".yellow());
                break;
            }
            Err(e) => {
                println!("Error reading line: {}", e);
                break;
            }
        }
    }

    println!("{}", "GoodBye!".bright_yellow());
}

/// 清屏并报告镜像状态
fn boot_screen(config: &ShellConfig) {
    let mut stdout = stdout();

    if let Err(e) = execute!(
        stdout,
        Clear(ClearType::All),
        cursor::MoveTo(0, 0),
        SetForegroundColor(Color::Cyan),
        Print(format!("Welcome to MiniFS v{}\n", env!("CARGO_PKG_VERSION"))),
        ResetColor
    ) {
        log::warn!("terminal setup failed: {}", e);
    }

    let disk = config.disk_path.display();
    match minifs::FileDisk::open_existing(&config.disk_path).map(minifs::FileSystem::open) {
        Ok(Ok(fs)) => {
            let geometry = fs.layout().geometry();
            println!(
                "💾 Mounted {} ({} B blocks x {}, {} inodes)",
                disk.to_string().cyan(),
                geometry.block_size(),
                geometry.num_blocks(),
                geometry.num_inodes()
            );
        }
        Ok(Err(e)) => println!(
            "{} {} ({}). Run 'format' first.",
            "⚠️  Cannot mount".yellow(),
            disk,
            e
        ),
        Err(_) => println!(
            "{} {}. Run 'format' to create it.",
            "🔧 No disk image at".yellow(),
            disk
        ),
    }
}
