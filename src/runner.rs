//! Test registration and execution against a host.
//!
//! Every [`TestCase`] gets a fresh host session. The session is opened
//! without the deployment plan when the case has a pre-deployment step, so
//! that step runs on a bare chain before the plan is loaded. The body then
//! sees a [`Chain`] plus the accounts and contracts of the session, and the
//! session is terminated afterwards whether the body passed, failed or
//! panicked.

use crate::chain::{index_accounts, index_contracts, Accounts, Chain, Contracts, NodeEndpoint, SessionId};
use crate::error::Result;
use crate::host::protocol::{LoadDeploymentRequest, NewSessionRequest, SessionResponse};
use crate::host::{invoke, HostBridge, HostOp};
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{info, warn};

/// What test bodies and scripts return.
pub type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

type PreDeployFn = Box<dyn FnOnce(&mut Chain<'_>, &Accounts) -> TestResult>;
type TestFn = Box<dyn FnOnce(&mut Chain<'_>, &Accounts, &Contracts) -> TestResult>;

const SCRIPT_SESSION_NAME: &str = "running script";

pub struct TestCase {
    name: String,
    only: bool,
    ignore: bool,
    deployment_path: Option<String>,
    pre_deployment: Option<PreDeployFn>,
    body: TestFn,
}

impl TestCase {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: FnOnce(&mut Chain<'_>, &Accounts, &Contracts) -> TestResult + 'static,
    {
        TestCase {
            name: name.into(),
            only: false,
            ignore: false,
            deployment_path: None,
            pre_deployment: None,
            body: Box::new(body),
        }
    }

    /// Run only the cases marked this way.
    pub fn only(mut self) -> Self {
        self.only = true;
        self
    }

    pub fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    pub fn deployment_path(mut self, path: impl Into<String>) -> Self {
        self.deployment_path = Some(path.into());
        self
    }

    /// Run `step` before the deployment plan is loaded.
    pub fn pre_deployment<F>(mut self, step: F) -> Self
    where
        F: FnOnce(&mut Chain<'_>, &Accounts) -> TestResult + 'static,
    {
        self.pre_deployment = Some(Box::new(step));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("only", &self.only)
            .field("ignore", &self.ignore)
            .field("deployment_path", &self.deployment_path)
            .field("pre_deployment", &self.pre_deployment.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed(String),
    Ignored,
    /// Skipped because other cases were marked `only`.
    Filtered,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestReport {
    pub results: Vec<(String, TestOutcome)>,
}

impl TestReport {
    fn count(&self, pred: impl Fn(&TestOutcome) -> bool) -> usize {
        self.results.iter().filter(|(_, o)| pred(o)).count()
    }

    pub fn passed(&self) -> usize {
        self.count(|o| *o == TestOutcome::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, TestOutcome::Failed(_)))
    }

    pub fn ignored(&self) -> usize {
        self.count(|o| *o == TestOutcome::Ignored)
    }

    pub fn filtered(&self) -> usize {
        self.count(|o| *o == TestOutcome::Filtered)
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn outcome(&self, name: &str) -> Option<&TestOutcome> {
        self.results.iter().find(|(n, _)| n == name).map(|(_, o)| o)
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed; {} failed; {} ignored; {} filtered out",
            self.passed(),
            self.failed(),
            self.ignored(),
            self.filtered()
        )
    }
}

pub struct TestRunner<H> {
    host: H,
    cases: Vec<TestCase>,
}

impl<H: HostBridge> TestRunner<H> {
    pub fn new(host: H) -> Self {
        TestRunner {
            host,
            cases: Vec::new(),
        }
    }

    pub fn test(&mut self, case: TestCase) -> &mut Self {
        self.cases.push(case);
        self
    }

    /// Run every registered case in registration order. Cases are consumed.
    pub fn run(&mut self) -> TestReport {
        let cases = std::mem::take(&mut self.cases);
        let focused = cases.iter().any(|c| c.only);
        let mut report = TestReport::default();

        for case in cases {
            let name = case.name.clone();
            let outcome = if case.ignore {
                TestOutcome::Ignored
            } else if focused && !case.only {
                TestOutcome::Filtered
            } else {
                execute_case(&mut self.host, case)
            };
            match &outcome {
                TestOutcome::Passed => info!(test = %name, "ok"),
                TestOutcome::Failed(reason) => warn!(test = %name, %reason, "FAILED"),
                TestOutcome::Ignored | TestOutcome::Filtered => info!(test = %name, ?outcome, "skipped"),
            }
            report.results.push((name, outcome));
        }
        report
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

struct SessionContext {
    session_id: SessionId,
    /// Height the host reached before the body starts.
    block_height: u64,
    accounts: Accounts,
    contracts: Contracts,
}

fn execute_case(host: &mut dyn HostBridge, case: TestCase) -> TestOutcome {
    let TestCase {
        name,
        deployment_path,
        pre_deployment,
        body,
        ..
    } = case;

    let session = match open_session(host, &name, deployment_path, pre_deployment) {
        Ok(session) => session,
        Err(reason) => return TestOutcome::Failed(reason),
    };

    let mut chain = Chain::resume(host, session.session_id, session.block_height);
    let verdict = guarded(|| body(&mut chain, &session.accounts, &session.contracts));
    let closed = chain.terminate();

    match (verdict, closed) {
        (Ok(()), Ok(())) => TestOutcome::Passed,
        (Ok(()), Err(e)) => TestOutcome::Failed(format!("terminate_session failed: {}", e)),
        (Err(reason), closed) => {
            if let Err(e) = closed {
                warn!(test = %name, err = %e, "terminate_session failed after test failure");
            }
            TestOutcome::Failed(reason)
        }
    }
}

fn open_session(
    host: &mut dyn HostBridge,
    name: &str,
    deployment_path: Option<String>,
    pre_deployment: Option<PreDeployFn>,
) -> std::result::Result<SessionContext, String> {
    let request = NewSessionRequest {
        name: name.to_string(),
        load_deployment: pre_deployment.is_none(),
        deployment_path: deployment_path.clone(),
    };
    let mut session: SessionResponse =
        invoke(&mut *host, HostOp::NewSession, &request).map_err(|e| e.to_string())?;

    let mut block_height = 1;
    if let Some(step) = pre_deployment {
        let session_id = session.session_id;
        let accounts = index_accounts(session.accounts.clone());
        let staged = guarded(|| {
            let mut chain = Chain::new(&mut *host, session_id);
            let outcome = step(&mut chain, &accounts);
            block_height = chain.block_height();
            outcome
        });
        let loaded = staged.and_then(|()| {
            let request = LoadDeploymentRequest {
                session_id,
                deployment_path,
            };
            invoke::<_, SessionResponse>(&mut *host, HostOp::LoadDeployment, &request).map_err(|e| e.to_string())
        });
        session = match loaded {
            Ok(loaded) => loaded,
            Err(reason) => {
                if let Err(e) = Chain::new(host, session_id).terminate() {
                    warn!(test = %name, err = %e, "terminate_session failed after pre-deployment failure");
                }
                return Err(reason);
            }
        };
    }

    Ok(SessionContext {
        session_id: session.session_id,
        block_height,
        accounts: index_accounts(session.accounts),
        contracts: index_contracts(session.contracts),
    })
}

/// Run `f`, turning both an `Err` and a panic into a failure message.
fn guarded(f: impl FnOnce() -> TestResult) -> std::result::Result<(), String> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

/// A session opened for a script against a live node.
#[derive(Debug, Clone)]
pub struct ScriptSession {
    pub session_id: SessionId,
    pub accounts: Accounts,
    pub contracts: Contracts,
    pub node: NodeEndpoint,
}

/// Open a `running script` session with the deployment plan loaded.
pub fn open_script_session(host: &mut dyn HostBridge, deployment_path: Option<&str>) -> Result<ScriptSession> {
    let request = NewSessionRequest {
        name: SCRIPT_SESSION_NAME.to_string(),
        load_deployment: true,
        deployment_path: deployment_path.map(str::to_string),
    };
    let session: SessionResponse = invoke(host, HostOp::NewSession, &request)?;
    info!(session_id = session.session_id, node = ?session.stacks_node_url, "script session opened");
    Ok(ScriptSession {
        session_id: session.session_id,
        accounts: index_accounts(session.accounts),
        contracts: index_contracts(session.contracts),
        node: NodeEndpoint {
            url: session.stacks_node_url,
        },
    })
}

/// Run `script` once against a fresh script session. The session is left
/// open; it lives as long as the host.
pub fn run_script<F>(host: &mut dyn HostBridge, script: F) -> TestResult
where
    F: FnOnce(&Accounts, &Contracts, &NodeEndpoint) -> TestResult,
{
    let session = open_script_session(host, None)?;
    script(&session.accounts, &session.contracts, &session.node)
}
