use crate::shell::command::Command;

pub const COMMANDS: [&str; 17] = [
    "help", "format", "ls", "pwd", "cd", "mkdir", "rmdir", "touch", "create", "rm", "mv", "cat",
    "read", "stat", "df", "check", "exit",
];

pub fn parse_command(input: &str) -> Option<Command> {
    let tokens: Vec<&str> = input.trim().split_ascii_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let cmd = tokens[0];
    let args = &tokens[1..];

    match cmd {
        "help" => Some(Command::Help),
        "ls" => Some(Command::Ls(args.first().map(|s| s.to_string()))),
        "pwd" => Some(Command::Pwd),
        "cd" => args.first().map(|&name| Command::Cd(name.to_string())),
        "mkdir" => args.first().map(|&name| Command::Mkdir(name.to_string())),
        "rmdir" => args.first().map(|&name| Command::Rmdir(name.to_string())),
        "touch" | "create" => args
            .first()
            .map(|&name| Command::Touch(name.to_string(), args[1..].join(" "))),
        "rm" => args.first().map(|&name| Command::Rm(name.to_string())),
        "mv" => match args {
            [from, to] => Some(Command::Mv(from.to_string(), to.to_string())),
            _ => None,
        },
        "cat" | "read" => args.first().map(|&name| Command::Cat(name.to_string())),
        "stat" => args.first().map(|&name| Command::Stat(name.to_string())),
        "df" => Some(Command::Df),
        "check" => Some(Command::Check),
        "format" => match args {
            [] => Some(Command::Format(None)),
            [bs, nb, ni] => Some(Command::Format(Some((
                bs.parse().ok()?,
                nb.parse().ok()?,
                ni.parse().ok()?,
            )))),
            _ => None,
        },
        "exit" | "quit" => Some(Command::Exit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touch_joins_content_words_with_single_spaces() {
        match parse_command("touch /a.txt hello  world") {
            Some(Command::Touch(path, content)) => {
                assert_eq!(path, "/a.txt");
                assert_eq!(content, "hello world");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn format_takes_zero_or_three_numbers() {
        assert!(matches!(parse_command("format"), Some(Command::Format(None))));
        assert!(matches!(
            parse_command("format 4 8 4"),
            Some(Command::Format(Some((4, 8, 4))))
        ));
        assert!(parse_command("format 4 8").is_none());
        assert!(parse_command("format a b c").is_none());
    }

    #[test]
    fn mv_needs_two_paths() {
        assert!(matches!(parse_command("mv /a /b"), Some(Command::Mv(_, _))));
        assert!(parse_command("mv /a").is_none());
        assert!(parse_command("frobnicate").is_none());
    }
}
