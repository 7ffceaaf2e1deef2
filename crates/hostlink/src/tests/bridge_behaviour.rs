//! Behavioural tests for the bridge start/stop lifecycle.

use std::cell::RefCell;
use std::io::{self, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use hostlink_config::BridgeEndpoint;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

use crate::bridge::{Bridge, BridgeError, BridgeSettings};
use crate::commands::{CommandContext, build_router};
use crate::resolver::CachedTypeResolver;
use crate::tests::support::{HealthEvent, HostHarness, RecordingHealthReporter, TestClient};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const STALLED_HOST_TIMEOUT: Duration = Duration::from_secs(10);
const FLOOD_BATCH_LINES: usize = 4096;

struct LifecycleWorld {
    host: HostHarness,
    reporter: Arc<RecordingHealthReporter>,
    bridge: Option<Bridge>,
    idle_client: Option<TcpStream>,
    waiting_client: Option<TestClient>,
    replies: Vec<Value>,
    start_error: Option<BridgeError>,
    stop_elapsed: Option<Duration>,
    reserved: Option<TcpListener>,
}

impl LifecycleWorld {
    fn new() -> Self {
        Self {
            host: HostHarness::spawn(Duration::from_secs(2)),
            reporter: Arc::new(RecordingHealthReporter::default()),
            bridge: None,
            idle_client: None,
            waiting_client: None,
            replies: Vec::new(),
            start_error: None,
            stop_elapsed: None,
            reserved: None,
        }
    }

    fn build_bridge(&mut self, port: u16) {
        let context = CommandContext::new(
            self.host.queue(),
            Arc::new(CachedTypeResolver::builtin()),
        );
        let router = build_router(&context).expect("router builds");
        let settings = BridgeSettings {
            endpoint: BridgeEndpoint::new("127.0.0.1", port),
            poll_interval: POLL_INTERVAL,
            ..BridgeSettings::default()
        };
        let reporter = Arc::clone(&self.reporter);
        self.bridge = Some(Bridge::new(settings, router, reporter));
    }

    fn bridge(&mut self) -> &mut Bridge {
        self.bridge.as_mut().expect("bridge configured")
    }

    fn try_start(&mut self) {
        if let Err(error) = self.bridge().start() {
            self.start_error = Some(error);
        }
    }

    fn ping(&mut self) {
        let address = self.bridge().local_addr().expect("bridge running");
        let reply = TestClient::connect(address).request("ping", json!({}));
        self.replies.push(reply);
    }
}

impl Drop for LifecycleWorld {
    fn drop(&mut self) {
        if let Some(bridge) = self.bridge.as_mut() {
            let _ = bridge.stop();
        }
    }
}

#[fixture]
fn world() -> RefCell<LifecycleWorld> {
    RefCell::new(LifecycleWorld::new())
}

#[given("a bridge on an ephemeral port")]
fn given_ephemeral_bridge(world: &RefCell<LifecycleWorld>) {
    world.borrow_mut().build_bridge(0);
}

#[given("a bridge on an ephemeral port over a stalled host")]
fn given_stalled_host_bridge(world: &RefCell<LifecycleWorld>) {
    let mut world = world.borrow_mut();
    world.host = HostHarness::stalled(STALLED_HOST_TIMEOUT);
    world.build_bridge(0);
}

#[given("a bridge on an occupied port")]
fn given_occupied_bridge(world: &RefCell<LifecycleWorld>) {
    let reserved = TcpListener::bind(("127.0.0.1", 0)).expect("reserve port");
    let port = reserved.local_addr().expect("reserved address").port();
    let mut world = world.borrow_mut();
    world.reserved = Some(reserved);
    world.build_bridge(port);
}

#[when("the bridge starts")]
fn when_bridge_starts(world: &RefCell<LifecycleWorld>) {
    world.borrow_mut().bridge().start().expect("bridge starts");
}

#[when("the bridge start is attempted")]
fn when_start_attempted(world: &RefCell<LifecycleWorld>) {
    world.borrow_mut().try_start();
}

#[when(r#"a client sends "{command}""#)]
fn when_client_sends(world: &RefCell<LifecycleWorld>, command: String) {
    let command = strip_quotes(&command);
    let mut world = world.borrow_mut();
    let address = world.bridge().local_addr().expect("bridge running");
    let mut client = TestClient::connect(address);
    let reply = client.request(command, json!({}));
    world.replies.push(reply);
    world.idle_client = Some(client.into_stream());
}

#[when("a client connects without sending")]
fn when_client_idles(world: &RefCell<LifecycleWorld>) {
    let mut world = world.borrow_mut();
    let address = world.bridge().local_addr().expect("bridge running");
    world.idle_client = Some(TcpStream::connect(address).expect("connect idle client"));
    assert!(
        world
            .reporter
            .wait_for(&HealthEvent::ClientConnected, 1, Duration::from_secs(2)),
        "listener never accepted the idle client"
    );
}

#[when(r#"a client submits "{command}" for "{name}" without waiting"#)]
fn when_client_submits(world: &RefCell<LifecycleWorld>, command: String, name: String) {
    let request = json!({
        "type": strip_quotes(&command),
        "params": { "name": strip_quotes(&name) },
    });
    let mut world = world.borrow_mut();
    let address = world.bridge().local_addr().expect("bridge running");
    let mut client = TestClient::connect(address);
    client.send_raw(format!("{request}\n").as_bytes());
    world.waiting_client = Some(client);
}

#[when("the host has {count} queued task")]
fn when_host_holds_tasks(world: &RefCell<LifecycleWorld>, count: usize) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while world.borrow().host.pending() < count {
        assert!(Instant::now() < deadline, "request never reached the host");
        thread::sleep(Duration::from_millis(5));
    }
}

#[when("the host loop closes")]
fn when_host_closes(world: &RefCell<LifecycleWorld>) {
    world.borrow_mut().host.close();
}

#[when("a client floods pings without reading replies")]
fn when_client_floods(world: &RefCell<LifecycleWorld>) {
    let mut world = world.borrow_mut();
    let address = world.bridge().local_addr().expect("bridge running");
    let mut stream = TcpStream::connect(address).expect("connect flooding client");
    stream
        .set_write_timeout(Some(Duration::from_millis(200)))
        .expect("set write timeout");
    let batch = b"{\"type\":\"ping\"}\n".repeat(FLOOD_BATCH_LINES);
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        match stream.write(&batch) {
            Ok(_) => {}
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) =>
            {
                break;
            }
            Err(error) => panic!("flooding client failed: {error}"),
        }
        assert!(Instant::now() < deadline, "bridge never stopped reading");
    }
    world.idle_client = Some(stream);
}

#[when("the bridge stops")]
fn when_bridge_stops(world: &RefCell<LifecycleWorld>) {
    let mut world = world.borrow_mut();
    let started = Instant::now();
    world.bridge().stop().expect("bridge stops");
    world.stop_elapsed = Some(started.elapsed());
}

#[when("the bridge is started and stopped {runs} times")]
fn when_bridge_cycles(world: &RefCell<LifecycleWorld>, runs: usize) {
    let mut world = world.borrow_mut();
    for _ in 0..runs {
        world.bridge().start().expect("bridge starts");
        world.ping();
        world.bridge().stop().expect("bridge stops");
    }
}

#[then("the ping reply reports the bridge alive")]
fn then_ping_alive(world: &RefCell<LifecycleWorld>) {
    let world = world.borrow();
    let reply = world.replies.last().expect("a reply was recorded");
    assert_eq!(reply, &json!({"success": true, "data": {"alive": true}}));
}

#[then("the bridge is running")]
fn then_bridge_running(world: &RefCell<LifecycleWorld>) {
    assert!(world.borrow_mut().bridge().is_running());
}

#[then("the bridge is not running")]
fn then_bridge_not_running(world: &RefCell<LifecycleWorld>) {
    assert!(!world.borrow_mut().bridge().is_running());
}

#[then("every run answered ping identically")]
fn then_runs_identical(world: &RefCell<LifecycleWorld>) {
    let world = world.borrow();
    let first = world.replies.first().expect("at least one run");
    assert!(world.replies.len() > 1, "expected several runs");
    assert!(world.replies.iter().all(|reply| reply == first));
}

#[then(r#"the bridge state is "{state}""#)]
fn then_bridge_state(world: &RefCell<LifecycleWorld>, state: String) {
    let state = strip_quotes(&state);
    assert_eq!(world.borrow_mut().bridge().state().to_string(), state);
}

#[then("the reporter saw {count} listener stops")]
fn then_listener_stops(world: &RefCell<LifecycleWorld>, count: usize) {
    assert_eq!(
        world.borrow().reporter.count(&HealthEvent::ListenerStopped),
        count
    );
}

#[then("the stop completed within {seconds} seconds")]
fn then_stop_bounded(world: &RefCell<LifecycleWorld>, seconds: u64) {
    let elapsed = world.borrow().stop_elapsed.expect("bridge was stopped");
    assert!(
        elapsed < Duration::from_secs(seconds),
        "stop took {elapsed:?}"
    );
}

#[then(r#"the waiting client is told "{prefix}""#)]
fn then_waiting_client_told(world: &RefCell<LifecycleWorld>, prefix: String) {
    let mut world = world.borrow_mut();
    let client = world.waiting_client.as_mut().expect("a client is waiting");
    let reply = client.read_response();
    assert_eq!(reply["success"], json!(false), "reply: {reply}");
    let error = reply["error"].as_str().expect("error is a string");
    assert!(
        error.starts_with(strip_quotes(&prefix)),
        "unexpected error: {error}"
    );
}

#[then("starting the bridge fails")]
fn then_start_fails(world: &RefCell<LifecycleWorld>) {
    let world = world.borrow();
    assert!(
        matches!(world.start_error, Some(BridgeError::Start { .. })),
        "expected a start failure, got {:?}",
        world.start_error
    );
}

#[then("the reporter saw a listener failure")]
fn then_listener_failure(world: &RefCell<LifecycleWorld>) {
    let failed = world
        .borrow()
        .reporter
        .events()
        .into_iter()
        .any(|event| matches!(event, HealthEvent::ListenerFailed(_)));
    assert!(failed, "expected a listener failure event");
}

#[then("the second start reports the bridge already running")]
fn then_already_running(world: &RefCell<LifecycleWorld>) {
    let world = world.borrow();
    assert!(
        matches!(world.start_error, Some(BridgeError::AlreadyRunning { .. })),
        "expected already running, got {:?}",
        world.start_error
    );
}

fn strip_quotes(value: &str) -> &str {
    value.trim_matches('"')
}

#[scenario(path = "tests/features/bridge_lifecycle.feature")]
fn bridge_lifecycle(#[from(world)] world: RefCell<LifecycleWorld>) {
    drop(world);
}
