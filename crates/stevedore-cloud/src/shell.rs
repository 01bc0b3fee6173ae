#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("failed to start `{program}`, is it installed and on PATH?")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("`{command}` failed ({}):\n{stderr}", exit_label(code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("`{command}` wrote to stderr:\n{stderr}")]
    StderrOutput { command: String, stderr: String },

    #[error("failed to relay output of `{program}`")]
    Stream {
        program: String,
        source: std::io::Error,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_owned(),
    }
}

/// Human-readable command line for error messages, with password values masked.
pub fn render_command(program: &str, args: &[String]) -> String {
    let mut rendered = program.to_owned();
    let mut mask_next = false;

    for arg in args {
        rendered.push(' ');
        if mask_next {
            rendered.push_str("****");
            mask_next = false;
            continue;
        }
        rendered.push_str(arg);
        mask_next = matches!(arg.as_str(), "-p" | "--password");
    }

    rendered
}
