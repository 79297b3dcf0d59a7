use crate::shell::{config::ShellConfig, start_shell};

mod shell;

fn main() {
    minifs::logging::init();
    start_shell(ShellConfig::from_env());
}
