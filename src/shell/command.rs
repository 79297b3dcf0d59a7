use colored::*;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use minifs::{DirEntryType, FileDisk, FileSystem};
use std::{error::Error, path::Path, time::Duration};

use crate::shell::config::ShellConfig;

#[derive(Debug)]
pub enum Command {
    Help,
    Format(Option<(usize, usize, usize)>),
    Ls(Option<String>),
    Pwd,
    Cd(String),
    Mkdir(String),
    Rmdir(String),
    Touch(String, String),
    Rm(String),
    Mv(String, String),
    Cat(String),
    Stat(String),
    Df,
    Check,
    Exit,
}

/// 一次 shell 会话的状态：只有配置和当前目录，文件系统本身每条命令都重新打开
#[derive(Debug)]
pub struct Session {
    pub config: ShellConfig,
    pub current_dir: String,
}

impl Session {
    pub fn new(config: ShellConfig) -> Self {
        Self {
            config,
            current_dir: String::from("/"),
        }
    }

    /// 相对路径拼到当前目录后面
    pub fn absolute(&self, path: &str) -> String {
        if path.starts_with('/') {
            path.to_string()
        } else if self.current_dir == "/" {
            format!("/{}", path)
        } else {
            format!("{}/{}", self.current_dir, path)
        }
    }

    fn disk_path(&self) -> &Path {
        &self.config.disk_path
    }

    fn mount(&self) -> minifs::Result<FileSystem<FileDisk>> {
        FileSystem::open(FileDisk::open_existing(self.disk_path())?)
    }
}

pub fn execute_command(cmd: &Command, session: &mut Session) -> Result<(), Box<dyn Error>> {
    match cmd {
        Command::Help => print_help(),
        Command::Format(geometry) => format_disk(session, *geometry)?,
        Command::Ls(path) => {
            let path = path
                .as_deref()
                .map(|p| session.absolute(p))
                .unwrap_or_else(|| session.current_dir.clone());
            let mut entries = session.mount()?.list_dir(&path)?;
            entries.sort_by(|a, b| match (&a.entry_type, &b.entry_type) {
                (DirEntryType::Directory, DirEntryType::File) => std::cmp::Ordering::Less,
                (DirEntryType::File, DirEntryType::Directory) => std::cmp::Ordering::Greater,
                _ => a.name.cmp(&b.name),
            });
            if entries.is_empty() {
                println!("{}", "(empty)".bright_black());
            }
            for entry in entries {
                match entry.entry_type {
                    DirEntryType::Directory => println!("📁  {}", entry.name.blue().bold()),
                    DirEntryType::File => println!(
                        "📄  {} {}",
                        entry.name,
                        format!("({} B)", entry.size).bright_black()
                    ),
                }
            }
        }
        Command::Pwd => println!("📍 {}", session.current_dir.cyan()),
        Command::Cd(path) => {
            let target = if path == ".." {
                match session.current_dir.rfind('/') {
                    Some(0) | None => "/".to_string(),
                    Some(pos) => session.current_dir[..pos].to_string(),
                }
            } else {
                session.absolute(path)
            };
            // 只确认目标目录存在
            session.mount()?.list_dir(&target)?;
            session.current_dir = target;
            println!("📂 Moved to {}", session.current_dir.blue());
        }
        Command::Mkdir(name) => {
            let path = session.absolute(name);
            minifs::create_directory(session.disk_path(), &path)?;
            println!("✅ Created directory: {}", path.green());
        }
        Command::Rmdir(name) => {
            let path = session.absolute(name);
            let (_, inode) = session.mount()?.stat(&path)?;
            if !inode.is_dir() {
                return Err(minifs::FileSystemError::NotADirectory(path).into());
            }
            minifs::remove(session.disk_path(), &path)?;
            println!("🗑️ Removed directory: {}", path.red());
        }
        Command::Touch(name, content) => {
            let path = session.absolute(name);
            minifs::create_file(session.disk_path(), &path, content.as_bytes())?;
            println!(
                "📝 Created file: {} {}",
                path.green(),
                format!("({} B)", content.len()).bright_black()
            );
        }
        Command::Rm(name) => {
            let path = session.absolute(name);
            let (_, inode) = session.mount()?.stat(&path)?;
            if inode.is_dir() {
                return Err(minifs::FileSystemError::IsADirectory(path).into());
            }
            minifs::remove(session.disk_path(), &path)?;
            println!("❌ Deleted file: {}", path.red());
        }
        Command::Mv(from, to) => {
            let (from, to) = (session.absolute(from), session.absolute(to));
            minifs::move_path(session.disk_path(), &from, &to)?;
            println!("🚚 Moved {} -> {}", from.cyan(), to.green());
        }
        Command::Cat(name) => {
            let path = session.absolute(name);
            let content = session.mount()?.read_file(&path)?;
            println!("{}", String::from_utf8_lossy(&content));
        }
        Command::Stat(name) => {
            let path = session.absolute(name);
            let fs = session.mount()?;
            let (slot, inode) = fs.stat(&path)?;
            let blocks = inode.blocks(fs.layout().block_size());
            println!(
                "{}\n{}: {}\n{}: {}\n{}: {}\n{}: {}\n{}: {:?}\n",
                "📊 File Info".bright_yellow().bold(),
                "Name".blue(),
                inode.name(),
                "Inode".blue(),
                slot,
                "Type".blue(),
                if inode.is_dir() { "Directory" } else { "File" },
                "Size".blue(),
                if inode.is_dir() {
                    format!("{} entries", inode.size)
                } else {
                    format!("{} bytes", inode.size)
                },
                "Blocks".blue(),
                blocks
            );
        }
        Command::Df => {
            let usage = session.mount()?.usage()?;
            println!(
                "{}\n{}: {}/{} used ({} B each)\n{}: {}/{} used",
                "💽 Disk Usage".bright_yellow().bold(),
                "Blocks".blue(),
                usage.used_blocks,
                usage.total_blocks,
                usage.block_size,
                "Inodes".blue(),
                usage.used_inodes,
                usage.total_inodes
            );
        }
        Command::Check => {
            let report = session.mount()?.check()?;
            if report.is_clean() {
                println!("{}", "✅ File system is consistent".green());
            } else {
                for problem in &report.problems {
                    println!("{} {}", "⚠️ ".yellow(), problem);
                }
            }
        }
        Command::Exit => println!("{}", "👋 Exiting MiniFS shell...".yellow().bold()),
    }

    Ok(())
}

fn format_disk(
    session: &mut Session,
    geometry: Option<(usize, usize, usize)>,
) -> Result<(), Box<dyn Error>> {
    let (block_size, num_blocks, num_inodes) =
        geometry.unwrap_or(session.config.default_geometry);

    let has_data = match FileDisk::open_existing(session.disk_path()) {
        Ok(disk) => !disk.is_empty()?,
        Err(_) => false,
    };
    if has_data {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "{} already holds data. Wipe it?",
                session.disk_path().display()
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Format cancelled.".bright_black());
            return Ok(());
        }
    }

    println!("💾 Formatting virtual disk...");
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb.set_message(format!(
        "block size {}, {} blocks, {} inodes",
        block_size, num_blocks, num_inodes
    ));

    let result = minifs::format(session.disk_path(), block_size, num_blocks, num_inodes);
    match result {
        Ok(()) => {
            pb.finish_with_message("✅ Disk formatted successfully!");
            session.current_dir = String::from("/");
            Ok(())
        }
        Err(e) => {
            pb.abandon_with_message("❌ Format failed");
            Err(e.into())
        }
    }
}

fn print_help() {
    println!("{}", "📘 MiniFS Commands".bright_cyan().bold());
    println!(
        "{}",
        "
  format [bs nb ni]      Format the disk (block size, blocks, inodes)
  ls [dir]               List directory entries
  pwd                    Print current path
  cd <dir>               Change directory
  mkdir <dir>            Create directory
  rmdir <dir>            Remove an empty directory
  touch <file> [text]    Create file with optional content
  rm <file>              Remove file
  mv <old> <new>         Move or rename
  cat <file>             Print file content
  stat <path>            Show inode info
  df                     Show block and inode usage
  check                  Verify on-disk consistency
  help                   Show this help message
  exit                   Quit the shell
"
        .bright_black()
    );
}
