pub mod commands;
pub mod orchestration;
pub mod process;
pub mod prompt;
pub mod shared;
pub mod workspace;

pub fn run(args: Vec<String>) -> Result<String, String> {
    commands::run_cli(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_adapter_rejects_unknown_commands() {
        let result = run(vec!["unknown-command".to_string()]);
        assert!(result.is_err());
    }
}
