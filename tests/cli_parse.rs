//! `agent-run` argument parsing.

use std::time::Duration;

use agent_run_client::cli::{Cli, Command};
use agent_run_client::poll::{Backoff, PollPolicy};
use clap::Parser;

#[test]
fn run_defaults_to_backoff_policy() {
    let cli = Cli::parse_from(["agent-run", "run"]);
    let Command::Run(args) = cli.command else {
        panic!("expected run command");
    };
    assert_eq!(
        args.policy(),
        PollPolicy::Backoff(Backoff {
            initial: Duration::from_secs(2),
            max_elapsed: Duration::from_secs(600),
            ..Backoff::default()
        })
    );
}

#[test]
fn run_fixed_reproduces_demonstration_schedule() {
    let cli = Cli::parse_from(["agent-run", "run", "--fixed"]);
    let Command::Run(args) = cli.command else {
        panic!("expected run command");
    };
    assert_eq!(args.policy(), PollPolicy::demonstration());

    let cli = Cli::parse_from(["agent-run", "run", "--fixed", "--interval", "5"]);
    let Command::Run(args) = cli.command else {
        panic!("expected run command");
    };
    assert_eq!(args.policy(), PollPolicy::fixed(3, Duration::from_secs(5)));
}

#[test]
fn run_backoff_flags() {
    let cli = Cli::parse_from([
        "agent-run",
        "run",
        "--interval",
        "1",
        "--max-elapsed",
        "30",
    ]);
    let Command::Run(args) = cli.command else {
        panic!("expected run command");
    };
    assert_eq!(
        args.policy(),
        PollPolicy::backoff(Duration::from_secs(1), Duration::from_secs(30))
    );
}

#[test]
fn zero_interval_is_rejected() {
    assert!(Cli::try_parse_from(["agent-run", "run", "--interval", "0"]).is_err());
    assert!(Cli::try_parse_from(["agent-run", "run", "--fixed", "--interval", "0"]).is_err());
}

#[test]
fn stream_flags_build_the_request() {
    let cli = Cli::parse_from([
        "agent-run",
        "--agent",
        "chatbot",
        "stream",
        "--message",
        "hello",
        "--state",
        r#"{"max_personas": 1}"#,
        "--no-tokens",
        "--blocking",
    ]);
    assert_eq!(cli.agent.as_deref(), Some("chatbot"));
    let Command::Stream(args) = cli.command else {
        panic!("expected stream command");
    };
    assert!(args.blocking);

    let input = args.input().unwrap();
    assert!(!input.stream_tokens);
    assert_eq!(input.input.message.as_deref(), Some("hello"));
    assert_eq!(input.input.state.unwrap()["max_personas"], 1);
}

#[test]
fn stream_without_state_uses_demonstration_state() {
    let cli = Cli::parse_from(["agent-run", "stream"]);
    let Command::Stream(args) = cli.command else {
        panic!("expected stream command");
    };
    let input = args.input().unwrap();
    assert!(input.stream_tokens);
    assert!(input.input.message.is_none());
    assert_eq!(
        input.input.state.unwrap()["appUrl"],
        "https://www.tvfoodmaps.com"
    );
}

#[test]
fn invalid_state_is_rejected() {
    let cli = Cli::parse_from(["agent-run", "stream", "--state", "not json"]);
    let Command::Stream(args) = cli.command else {
        panic!("expected stream command");
    };
    let err = args.input().unwrap_err();
    assert!(err.to_string().contains("--state must be a JSON object"));
}

#[test]
fn global_flags_after_subcommand() {
    let cli = Cli::parse_from([
        "agent-run",
        "invoke",
        "hi there",
        "--base-url",
        "http://localhost:9000",
        "--model",
        "gpt-4o",
    ]);
    assert_eq!(cli.base_url.as_deref(), Some("http://localhost:9000"));
    assert_eq!(cli.model.as_deref(), Some("gpt-4o"));
    match cli.command {
        Command::Invoke {
            message, thread_id, ..
        } => {
            assert_eq!(message, "hi there");
            assert!(thread_id.is_none());
        }
        other => panic!("expected invoke, got {other:?}"),
    }
}

#[test]
fn unknown_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["agent-run", "explode"]).is_err());
}
