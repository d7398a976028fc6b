use std::collections::HashMap;
use std::io;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Duration, Instant};
use uuid::Uuid;

use crate::error::{GenerateError, WorkbenchError};
use crate::structs::alias::{QuestionIndex, SessionId};
use crate::structs::form::FormDraft;
use crate::structs::question::{GenerateResponse, QuestionType};
use crate::structs::submit::ScoreResponse;
use crate::workbench::Workbench;

type Reply<T> = oneshot::Sender<Result<T, WorkbenchError>>;

#[derive(Debug)]
enum Command {
    Create {
        res_tx: oneshot::Sender<SessionId>,
    },
    Snapshot {
        id: SessionId,
        res_tx: Reply<Workbench>,
    },
    Reject {
        id: SessionId,
        draft: FormDraft,
        reason: String,
        res_tx: Reply<()>,
    },
    BeginSubmit {
        id: SessionId,
        draft: FormDraft,
        question_type: QuestionType,
        res_tx: Reply<()>,
    },
    Resolve {
        id: SessionId,
        result: Result<GenerateResponse, GenerateError>,
        res_tx: Reply<()>,
    },
    SelectChoice {
        id: SessionId,
        question: QuestionIndex,
        option: String,
        res_tx: Reply<bool>,
    },
    WriteEssay {
        id: SessionId,
        question: QuestionIndex,
        text: String,
        res_tx: Reply<()>,
    },
    Score {
        id: SessionId,
        res_tx: Reply<ScoreResponse>,
    },
}

struct Entry {
    workbench: Workbench,
    last_seen: Instant,
}

/// 持有所有工作台，命令在同一个任务里依次执行
pub struct WorkbenchServer {
    /// 工作台ID和工作台的键值对
    sessions: HashMap<SessionId, Entry>,

    /// 闲置超过该时长的工作台会被清除
    ttl: Duration,

    /// 接收命令的管道
    cmd_rx: mpsc::UnboundedReceiver<Command>,
}

impl WorkbenchServer {
    pub fn new(ttl: Duration) -> (WorkbenchServer, WorkbenchServerHandle) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        (
            WorkbenchServer {
                sessions: HashMap::new(),
                ttl,
                cmd_rx,
            },
            WorkbenchServerHandle { cmd_tx },
        )
    }

    fn create(&mut self) -> SessionId {
        let id = Uuid::new_v4();
        self.sessions.insert(
            id,
            Entry {
                workbench: Workbench::new(),
                last_seen: Instant::now(),
            },
        );
        log::debug!("新建工作台{id}");
        id
    }

    fn with<T>(
        &mut self,
        id: SessionId,
        f: impl FnOnce(&mut Workbench) -> Result<T, WorkbenchError>,
    ) -> Result<T, WorkbenchError> {
        let entry = self.sessions.get_mut(&id).ok_or(WorkbenchError::NoSuchSession(id))?;
        entry.last_seen = Instant::now();
        f(&mut entry.workbench)
    }

    /// 清除闲置的工作台，请求进行中的不清除
    fn prune(&mut self) {
        let now = Instant::now();
        let ttl = self.ttl;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| entry.workbench.is_loading() || now.duration_since(entry.last_seen) < ttl);
        let removed = before - self.sessions.len();
        if removed > 0 {
            log::info!("清除了{removed}个过期工作台");
        }
    }

    pub async fn run(mut self) -> io::Result<()> {
        let mut interval = time::interval(Duration::from_secs(60).min(self.ttl));

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    self.handle(cmd);
                }
                // 定时清除过期工作台
                _ = interval.tick() => self.prune(),
            }
        }

        Ok(())
    }

    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Create { res_tx } => {
                let _ = res_tx.send(self.create());
            }
            Command::Snapshot { id, res_tx } => {
                let _ = res_tx.send(self.with(id, |w| Ok(w.clone())));
            }
            Command::Reject { id, draft, reason, res_tx } => {
                let _ = res_tx.send(self.with(id, |w| w.reject(draft, reason)));
            }
            Command::BeginSubmit { id, draft, question_type, res_tx } => {
                let _ = res_tx.send(self.with(id, |w| w.begin_submit(draft, question_type)));
            }
            Command::Resolve { id, result, res_tx } => {
                let _ = res_tx.send(self.with(id, |w| {
                    w.resolve(result);
                    Ok(())
                }));
            }
            Command::SelectChoice { id, question, option, res_tx } => {
                let _ = res_tx.send(self.with(id, |w| w.select_choice(question, &option)));
            }
            Command::WriteEssay { id, question, text, res_tx } => {
                let _ = res_tx.send(self.with(id, |w| w.write_essay(question, text)));
            }
            Command::Score { id, res_tx } => {
                let _ = res_tx.send(self.with(id, |w| w.calculate_score()));
            }
        }
    }
}

/// handler层
#[derive(Debug, Clone)]
pub struct WorkbenchServerHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl WorkbenchServerHandle {
    async fn call<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, WorkbenchError> {
        let (res_tx, res_rx) = oneshot::channel();
        self.cmd_tx
            .send(make(res_tx))
            .map_err(|_| WorkbenchError::ServerClosed)?;
        res_rx.await.map_err(|_| WorkbenchError::ServerClosed)?
    }

    /// 新建一个空白工作台
    pub async fn create(&self) -> Result<SessionId, WorkbenchError> {
        let (res_tx, res_rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Create { res_tx })
            .map_err(|_| WorkbenchError::ServerClosed)?;
        res_rx.await.map_err(|_| WorkbenchError::ServerClosed)
    }

    pub async fn snapshot(&self, id: SessionId) -> Result<Workbench, WorkbenchError> {
        self.call(|res_tx| Command::Snapshot { id, res_tx }).await
    }

    pub async fn reject(&self, id: SessionId, draft: FormDraft, reason: String) -> Result<(), WorkbenchError> {
        self.call(|res_tx| Command::Reject { id, draft, reason, res_tx }).await
    }

    pub async fn begin_submit(
        &self,
        id: SessionId,
        draft: FormDraft,
        question_type: QuestionType,
    ) -> Result<(), WorkbenchError> {
        self.call(|res_tx| Command::BeginSubmit { id, draft, question_type, res_tx }).await
    }

    pub async fn resolve(
        &self,
        id: SessionId,
        result: Result<GenerateResponse, GenerateError>,
    ) -> Result<(), WorkbenchError> {
        self.call(|res_tx| Command::Resolve { id, result, res_tx }).await
    }

    pub async fn select_choice(
        &self,
        id: SessionId,
        question: QuestionIndex,
        option: String,
    ) -> Result<bool, WorkbenchError> {
        self.call(|res_tx| Command::SelectChoice { id, question, option, res_tx }).await
    }

    pub async fn write_essay(&self, id: SessionId, question: QuestionIndex, text: String) -> Result<(), WorkbenchError> {
        self.call(|res_tx| Command::WriteEssay { id, question, text, res_tx }).await
    }

    pub async fn score(&self, id: SessionId) -> Result<ScoreResponse, WorkbenchError> {
        self.call(|res_tx| Command::Score { id, res_tx }).await
    }
}
