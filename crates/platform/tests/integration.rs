//! Tests against real child processes spawned through `sh`

use rootstrap_errors::{Error, PlatformError};
use rootstrap_events::{channel, AppEvent, PlatformEvent};
use rootstrap_platform::{LineSource, Platform, PlatformCommand, PlatformContext};

fn sh(script: &str) -> PlatformCommand {
    let mut cmd = PlatformCommand::new("sh");
    cmd.arg("-c").arg(script);
    cmd
}

async fn drain(source: &mut Box<dyn LineSource>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(line) = source.next_line().await.unwrap() {
        lines.push(line);
    }
    lines
}

#[tokio::test]
async fn lines_arrive_in_order_with_exit_code() {
    let platform = Platform::current();
    let ctx = PlatformContext::default();
    let mut source = platform
        .spawn_lines(&ctx, sh("printf '(2)\\r\\ndownloading a.pkg.tar.xz\\nlast'; exit 3"))
        .await
        .unwrap();

    assert_eq!(
        drain(&mut source).await,
        vec!["(2)", "downloading a.pkg.tar.xz", "last"]
    );
    assert_eq!(source.wait().await.unwrap(), Some(3));
    // already reaped
    source.kill().await.unwrap();
}

#[tokio::test]
async fn undecodable_lines_are_skipped() {
    let (tx, mut rx) = channel();
    let ctx = PlatformContext::new(Some(tx));
    let mut source = Platform::current()
        .spawn_lines(&ctx, sh("printf 'before\\n\\377\\376\\nafter\\n'"))
        .await
        .unwrap();

    assert_eq!(drain(&mut source).await, vec!["before", "after"]);
    assert_eq!(source.wait().await.unwrap(), Some(0));
    drop(source);
    drop(ctx);

    let mut skipped = 0;
    let mut exited = false;
    while let Some(message) = rx.recv().await {
        match message.event {
            AppEvent::Platform(PlatformEvent::LineSkipped { bytes, .. }) => {
                assert_eq!(bytes, 2);
                skipped += 1;
            }
            AppEvent::Platform(PlatformEvent::ProcessExited { lines, .. }) => {
                assert_eq!(lines, 2);
                exited = true;
            }
            _ => {}
        }
    }
    assert_eq!(skipped, 1);
    assert!(exited);
}

#[tokio::test]
async fn environment_overrides_reach_the_child() {
    let mut cmd = sh("echo \"$LC_ALL\"");
    cmd.env("LC_ALL", "C");
    let mut source = Platform::current()
        .spawn_lines(&PlatformContext::default(), cmd)
        .await
        .unwrap();
    assert_eq!(drain(&mut source).await, vec!["C"]);
    assert_eq!(source.wait().await.unwrap(), Some(0));
}

#[tokio::test]
async fn missing_program_is_a_launch_error() {
    let cmd = PlatformCommand::new("/nonexistent/rootstrap-no-such-program");
    let err = match Platform::current()
        .spawn_lines(&PlatformContext::default(), cmd)
        .await
    {
        Ok(_) => panic!("spawn should fail"),
        Err(err) => err,
    };
    match err {
        Error::Platform(platform) => {
            assert!(platform.is_launch_error());
            assert!(matches!(platform, PlatformError::CommandNotFound { .. }));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn kill_terminates_a_running_child() {
    let mut source = Platform::current()
        .spawn_lines(&PlatformContext::default(), sh("echo started; exec sleep 30"))
        .await
        .unwrap();
    assert_eq!(source.next_line().await.unwrap().as_deref(), Some("started"));

    source.kill().await.unwrap();
    // killed by signal: no exit code
    assert_eq!(source.wait().await.unwrap(), None);
}

#[tokio::test]
async fn execute_command_collects_output() {
    let output = Platform::current()
        .execute_command(&PlatformContext::default(), sh("echo out; echo err >&2; exit 1"))
        .await
        .unwrap();
    assert_eq!(output.exit_code, Some(1));
    assert!(!output.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "out\n");
    assert_eq!(String::from_utf8_lossy(&output.stderr), "err\n");
}
