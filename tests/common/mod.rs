#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use taskboard::client::{ClientError, Credentials, Reply, TaskApi};
use taskboard::task::{Priority, Task, TaskDraft, TaskId};

/// Connectivity of the fake backend; a disconnected backend fails every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    Connected,
    Disconnected,
}

/// In-memory stand-in for the REST backend that records what it was sent.
pub struct FakeApi {
    pub connectivity: Cell<Connectivity>,
    pub tasks: RefCell<Vec<Task>>,
    pub next_id: Cell<i64>,
    pub register_reply: RefCell<Result<Reply, (u16, String)>>,
    pub login_reply: RefCell<Result<Reply, (u16, String)>>,
    pub registered: RefCell<Vec<Credentials>>,
    pub logins: RefCell<Vec<Credentials>>,
    pub created: RefCell<Vec<(String, TaskDraft)>>,
    pub updated: RefCell<Vec<(String, TaskId, TaskDraft)>>,
    pub deleted: RefCell<Vec<(String, TaskId)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            connectivity: Cell::new(Connectivity::Connected),
            tasks: RefCell::new(Vec::new()),
            next_id: Cell::new(100),
            register_reply: RefCell::new(Ok(Reply::Text("User registered".to_string()))),
            login_reply: RefCell::new(Ok(Reply::Text("Login successful".to_string()))),
            registered: RefCell::new(Vec::new()),
            logins: RefCell::new(Vec::new()),
            created: RefCell::new(Vec::new()),
            updated: RefCell::new(Vec::new()),
            deleted: RefCell::new(Vec::new()),
        }
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let api = Self::new();
        *api.tasks.borrow_mut() = tasks;
        api
    }

    pub fn disconnect(&self) {
        self.connectivity.set(Connectivity::Disconnected);
    }

    fn blow_up_if_disconnected(&self) -> Result<(), ClientError> {
        match self.connectivity.get() {
            Connectivity::Connected => Ok(()),
            Connectivity::Disconnected => Err(ClientError::Status {
                status: 503,
                message: "could not connect to service!".to_string(),
            }),
        }
    }

    fn canned(reply: &RefCell<Result<Reply, (u16, String)>>) -> Result<Reply, ClientError> {
        match &*reply.borrow() {
            Ok(reply) => Ok(reply.clone()),
            Err((status, message)) => Err(ClientError::Status {
                status: *status,
                message: message.clone(),
            }),
        }
    }

    fn materialize(id: TaskId, draft: &TaskDraft) -> Task {
        Task {
            id,
            text: draft.text.clone(),
            completed: draft.completed,
            due_date: draft.due_date.clone(),
            priority: draft.priority.clone(),
            category: Some(draft.category.clone()),
        }
    }
}

impl TaskApi for FakeApi {
    fn register(&self, credentials: &Credentials) -> Result<Reply, ClientError> {
        self.blow_up_if_disconnected()?;
        self.registered.borrow_mut().push(credentials.clone());
        Self::canned(&self.register_reply)
    }

    fn login(&self, credentials: &Credentials) -> Result<Reply, ClientError> {
        self.blow_up_if_disconnected()?;
        self.logins.borrow_mut().push(credentials.clone());
        Self::canned(&self.login_reply)
    }

    fn list_tasks(&self, _username: &str) -> Result<Vec<Task>, ClientError> {
        self.blow_up_if_disconnected()?;
        Ok(self.tasks.borrow().clone())
    }

    fn create_task(&self, username: &str, draft: &TaskDraft) -> Result<Task, ClientError> {
        self.blow_up_if_disconnected()?;
        self.created
            .borrow_mut()
            .push((username.to_string(), draft.clone()));
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let task = Self::materialize(TaskId::Number(id), draft);
        self.tasks.borrow_mut().push(task.clone());
        Ok(task)
    }

    fn update_task(
        &self,
        username: &str,
        id: &TaskId,
        draft: &TaskDraft,
    ) -> Result<Task, ClientError> {
        self.blow_up_if_disconnected()?;
        self.updated
            .borrow_mut()
            .push((username.to_string(), id.clone(), draft.clone()));
        let task = Self::materialize(id.clone(), draft);
        let mut tasks = self.tasks.borrow_mut();
        match tasks.iter_mut().find(|t| &t.id == id) {
            Some(slot) => {
                *slot = task.clone();
                Ok(task)
            }
            None => Err(ClientError::Status {
                status: 404,
                message: "Task not found".to_string(),
            }),
        }
    }

    fn delete_task(&self, username: &str, id: &TaskId) -> Result<(), ClientError> {
        self.blow_up_if_disconnected()?;
        self.deleted
            .borrow_mut()
            .push((username.to_string(), id.clone()));
        self.tasks.borrow_mut().retain(|t| &t.id != id);
        Ok(())
    }
}

pub fn task(id: i64, text: &str, completed: bool) -> Task {
    Task {
        id: TaskId::Number(id),
        text: text.to_string(),
        completed,
        due_date: None,
        priority: Priority::Medium,
        category: None,
    }
}
