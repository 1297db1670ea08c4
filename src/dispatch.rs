//! # Request Dispatch
//!
//! Callers never block on printer I/O. Requests go into a bounded queue,
//! a fixed pool of workers runs each one on tokio's blocking thread pool,
//! and every result comes back exactly once on a single completion channel,
//! tagged with the id returned at submission.
//!
//! ```text
//! submit ──► [bounded queue] ──► worker 1..N ──► spawn_blocking(handle)
//!                                                     │
//! caller ◄──────────── completion channel ◄───────────┘
//! ```

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::connection::ConnectionManager;
use crate::discovery::{self, InterfaceFilter, PortDescriptor, PortScanner, SystemScanner};
use crate::emulation::EmulationSelector;
use crate::error::CometaError;
use crate::job::PrintJob;
use crate::session::{PrintSession, SessionOutcome, StatusReport};
use crate::transport::{PortOpener, SystemPortOpener};

pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

#[derive(Debug, Clone)]
pub enum Request {
    Discover {
        filter: InterfaceFilter,
    },
    CheckStatus {
        port_name: String,
        emulation: EmulationSelector,
    },
    Print {
        port_name: String,
        emulation: EmulationSelector,
        job: PrintJob,
    },
    Connect {
        port_name: String,
        emulation: EmulationSelector,
        has_barcode_reader: bool,
    },
    Disconnect,
}

impl Request {
    /// Error code reported when this request fails.
    pub fn error_code(&self) -> &'static str {
        match self {
            Request::Discover { .. } => "PORT_DISCOVERY_ERROR",
            Request::CheckStatus { .. } => "CHECK_STATUS_ERROR",
            Request::Print { .. } => "STARIO_PORT_EXCEPTION",
            Request::Connect { .. } | Request::Disconnect => "CONNECT_ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Ports(Vec<PortDescriptor>),
    Status(StatusReport),
    Printed(SessionOutcome),
    Connected(String),
    Disconnected,
    Failed { code: String, message: String },
}

impl Response {
    fn failed(code: &str, message: impl ToString) -> Self {
        Response::Failed {
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Response::Failed { .. })
    }
}

/// A finished request.
#[derive(Debug, Clone)]
pub struct Completion {
    pub id: Uuid,
    pub response: Response,
}

/// Everything a worker needs to serve requests.
#[derive(Clone)]
pub struct Services {
    pub session: PrintSession,
    pub scanner: Arc<dyn PortScanner>,
    pub connections: Arc<ConnectionManager>,
}

impl Services {
    pub fn new(
        opener: Arc<dyn PortOpener>,
        scanner: Arc<dyn PortScanner>,
        config: SessionConfig,
    ) -> Self {
        Self {
            session: PrintSession::new(opener.clone()).with_config(config),
            scanner,
            connections: Arc::new(ConnectionManager::new(opener, config)),
        }
    }

    /// Real ports and the system scanner.
    pub fn system(config: SessionConfig, lan_hosts: Vec<String>) -> Self {
        let scanner = SystemScanner {
            lan_hosts,
            ..Default::default()
        };
        Self::new(Arc::new(SystemPortOpener), Arc::new(scanner), config)
    }

    /// Serve one request. Blocks for as long as the printer I/O takes.
    pub fn handle(&self, request: Request) -> Response {
        let code = request.error_code();
        match request {
            Request::Discover { filter } => match discovery::discover(self.scanner.as_ref(), filter) {
                Ok(ports) => Response::Ports(ports),
                Err(e) => Response::failed(code, e),
            },
            Request::CheckStatus {
                port_name,
                emulation,
            } => match self.session.check_status(&port_name, emulation) {
                Ok(report) => Response::Status(report),
                Err(e) => Response::failed(code, e),
            },
            Request::Print {
                port_name,
                emulation,
                job,
            } => match self.session.print(&port_name, emulation, &job) {
                Ok(outcome) => Response::Printed(outcome),
                Err(e) => Response::failed(code, e),
            },
            Request::Connect {
                port_name,
                emulation,
                has_barcode_reader,
            } => match self
                .connections
                .connect(&port_name, emulation, has_barcode_reader)
            {
                Ok(message) => Response::Connected(message),
                Err(e) => Response::failed(code, e),
            },
            Request::Disconnect => match self.connections.disconnect() {
                Ok(()) => Response::Disconnected,
                Err(e) => Response::failed(code, e),
            },
        }
    }
}

struct Envelope {
    id: Uuid,
    request: Request,
}

/// Handle to the worker pool.
pub struct Dispatcher {
    queue: mpsc::Sender<Envelope>,
    workers: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    /// Start `workers` workers behind a queue of `capacity` requests.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        services: Services,
        workers: usize,
        capacity: usize,
    ) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (queue, inbox) = mpsc::channel::<Envelope>(capacity.max(1));
        let (done, completions) = mpsc::unbounded_channel();
        let inbox = Arc::new(Mutex::new(inbox));

        let workers = (0..workers.max(1))
            .map(|worker| {
                let inbox = Arc::clone(&inbox);
                let services = services.clone();
                let done = done.clone();
                tokio::spawn(async move {
                    loop {
                        let next = inbox.lock().await.recv().await;
                        let Some(Envelope { id, request }) = next else {
                            break;
                        };
                        tracing::debug!(worker, %id, code = request.error_code(), "handling request");

                        let code = request.error_code();
                        let services = services.clone();
                        let response =
                            match tokio::task::spawn_blocking(move || services.handle(request))
                                .await
                            {
                                Ok(response) => response,
                                Err(e) => Response::failed(code, format!("Task error: {e}")),
                            };

                        if done.send(Completion { id, response }).is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();

        (Self { queue, workers }, completions)
    }

    /// Queue a request, waiting for room.
    pub async fn submit(&self, request: Request) -> Result<Uuid, CometaError> {
        let id = Uuid::new_v4();
        self.queue
            .send(Envelope { id, request })
            .await
            .map_err(|_| CometaError::Transport("dispatcher has stopped".to_string()))?;
        Ok(id)
    }

    /// Queue a request, failing with [`CometaError::Busy`] when the queue is full.
    pub fn try_submit(&self, request: Request) -> Result<Uuid, CometaError> {
        let id = Uuid::new_v4();
        self.queue
            .try_send(Envelope { id, request })
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    CometaError::Busy("request queue is full".to_string())
                }
                mpsc::error::TrySendError::Closed(_) => {
                    CometaError::Transport("dispatcher has stopped".to_string())
                }
            })?;
        Ok(id)
    }

    /// Stop accepting requests and wait for queued ones to finish.
    pub async fn shutdown(self) {
        drop(self.queue);
        for worker in self.workers {
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "worker ended abnormally");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{RawPortInfo, ScanTarget};
    use crate::emulation::Emulation;
    use crate::job::CommandDescriptor;
    use crate::transport::mock::{MockOpener, MockScript};

    struct OnePrinter;

    impl PortScanner for OnePrinter {
        fn scan(&self, target: ScanTarget) -> Result<Vec<RawPortInfo>, CometaError> {
            Ok(match target {
                ScanTarget::Tcp => vec![RawPortInfo {
                    port_name: "TCP:10.0.0.9".into(),
                    ..Default::default()
                }],
                _ => Vec::new(),
            })
        }
    }

    fn services(script: MockScript) -> Services {
        Services::new(
            Arc::new(MockOpener::new(script)),
            Arc::new(OnePrinter),
            SessionConfig::IMMEDIATE,
        )
    }

    #[test]
    fn test_handle_print_failure_code() {
        let services = services(MockScript {
            fail_write: Some("broken pipe".into()),
            ..Default::default()
        });
        let response = services.handle(Request::Print {
            port_name: "TCP:p".into(),
            emulation: Emulation::StarLine.into(),
            job: vec![CommandDescriptor::new().with("append", "hi")],
        });
        match response {
            Response::Failed { code, message } => {
                assert_eq!(code, "STARIO_PORT_EXCEPTION");
                assert!(message.contains("Failed After Port Opened,"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_handle_disconnect_without_connection() {
        let response = services(MockScript::default()).handle(Request::Disconnect);
        assert_eq!(
            response,
            Response::Failed {
                code: "CONNECT_ERROR".into(),
                message: "No printer connected".into()
            }
        );
    }

    #[tokio::test]
    async fn test_completions_carry_ids() {
        let (dispatcher, mut completions) =
            Dispatcher::start(services(MockScript::default()), 2, 4);

        let discover = dispatcher
            .submit(Request::Discover {
                filter: InterfaceFilter::All,
            })
            .await
            .unwrap();
        let print = dispatcher
            .submit(Request::Print {
                port_name: "TCP:p".into(),
                emulation: Emulation::EscPos.into(),
                job: Vec::new(),
            })
            .await
            .unwrap();

        let mut seen = Vec::new();
        for _ in 0..2 {
            let completion = completions.recv().await.unwrap();
            if completion.id == discover {
                assert!(matches!(&completion.response, Response::Ports(p) if p.len() == 1));
            } else {
                assert_eq!(completion.id, print);
                assert!(matches!(&completion.response, Response::Printed(o) if o.is_success));
            }
            seen.push(completion.id);
        }
        assert_eq!(seen.len(), 2);
        assert_ne!(seen[0], seen[1]);
        dispatcher.shutdown().await;
    }

    #[tokio::test]
    async fn test_try_submit_when_full() {
        let (queue, _inbox) = mpsc::channel(1);
        let dispatcher = Dispatcher {
            queue,
            workers: Vec::new(),
        };
        assert!(dispatcher.try_submit(Request::Disconnect).is_ok());
        assert!(matches!(
            dispatcher.try_submit(Request::Disconnect),
            Err(CometaError::Busy(_))
        ));
    }

    #[test]
    fn test_response_json() {
        let json = serde_json::to_value(Response::Connected("Printer Connected".into())).unwrap();
        assert_eq!(json, serde_json::json!("Printer Connected"));
        let json = serde_json::to_value(Response::failed("CONNECT_ERROR", "boom")).unwrap();
        assert_eq!(json["code"], "CONNECT_ERROR");
    }
}
