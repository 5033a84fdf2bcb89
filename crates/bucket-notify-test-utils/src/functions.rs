//! In-memory function registry

use bucket_notify_common::{
    ApiError, FunctionDeployment, FunctionInfo, FunctionOperations, ResourceKind,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Operation selector for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionOp {
    Read,
    Create,
    Update,
    Delete,
}

/// A recorded call against the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionCall {
    Read(String),
    Create(String),
    Update(String),
    Delete(String),
}

#[derive(Debug, Default)]
struct State {
    functions: BTreeMap<String, FunctionDeployment>,
    calls: Vec<FunctionCall>,
    failures: HashMap<(FunctionOp, String), ApiError>,
}

/// Fake function registry
#[derive(Debug, Default)]
pub struct FakeFunctions {
    state: Mutex<State>,
}

impl FakeFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing function with an empty package
    pub fn with_function(self, name: &str) -> Self {
        let deployment = FunctionDeployment {
            name: name.to_string(),
            package: Vec::new(),
            timeout_secs: 3,
            environment: BTreeMap::new(),
            role_arn: "arn:aws:iam::123456789012:role/existing".to_string(),
            runtime: "provided.al2023".to_string(),
            handler: "bootstrap".to_string(),
        };
        self.state
            .lock()
            .unwrap()
            .functions
            .insert(name.to_string(), deployment);
        self
    }

    /// Make every call of `op` against `name` fail with `error`
    pub fn fail_on(self, op: FunctionOp, name: &str, error: ApiError) -> Self {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((op, name.to_string()), error);
        self
    }

    /// All calls so far, in order
    pub fn calls(&self) -> Vec<FunctionCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.state.lock().unwrap().functions.contains_key(name)
    }

    /// The deployment currently stored under `name`
    pub fn deployment(&self, name: &str) -> Option<FunctionDeployment> {
        self.state.lock().unwrap().functions.get(name).cloned()
    }

    /// ARN the fake reports for a function
    pub fn arn_for(name: &str) -> String {
        format!("arn:aws:lambda:us-east-1:123456789012:function:{name}")
    }

    fn record(&self, call: FunctionCall, op: FunctionOp, name: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.failures.get(&(op, name.to_string())) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn info(name: &str) -> FunctionInfo {
        FunctionInfo {
            name: name.to_string(),
            arn: Self::arn_for(name),
        }
    }
}

impl FunctionOperations for FakeFunctions {
    async fn read_function(&self, name: &str) -> Result<FunctionInfo, ApiError> {
        self.record(FunctionCall::Read(name.to_string()), FunctionOp::Read, name)?;
        if self.has_function(name) {
            Ok(Self::info(name))
        } else {
            Err(ApiError::not_found(ResourceKind::Function, name))
        }
    }

    async fn create_function(&self, deployment: &FunctionDeployment) -> Result<FunctionInfo, ApiError> {
        let name = deployment.name.as_str();
        self.record(FunctionCall::Create(name.to_string()), FunctionOp::Create, name)?;
        let mut state = self.state.lock().unwrap();
        if state.functions.contains_key(name) {
            return Err(ApiError::conflict(ResourceKind::Function, name));
        }
        state.functions.insert(name.to_string(), deployment.clone());
        Ok(Self::info(name))
    }

    async fn update_function(&self, deployment: &FunctionDeployment) -> Result<FunctionInfo, ApiError> {
        let name = deployment.name.as_str();
        self.record(FunctionCall::Update(name.to_string()), FunctionOp::Update, name)?;
        let mut state = self.state.lock().unwrap();
        match state.functions.get_mut(name) {
            Some(existing) => {
                *existing = deployment.clone();
                Ok(Self::info(name))
            }
            None => Err(ApiError::not_found(ResourceKind::Function, name)),
        }
    }

    async fn delete_function(&self, name: &str) -> Result<(), ApiError> {
        self.record(FunctionCall::Delete(name.to_string()), FunctionOp::Delete, name)?;
        let mut state = self.state.lock().unwrap();
        state
            .functions
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ApiError::not_found(ResourceKind::Function, name))
    }
}
