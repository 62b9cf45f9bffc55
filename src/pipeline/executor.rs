//! Generic short-circuiting pipeline executor.
//!
//! A pipeline is a named, ordered sequence of stages. Each stage either
//! continues the chain with a (possibly mutated) context or halts it
//! without error. A stage error is caught here at the execution boundary,
//! logged, and the invocation abandoned — it is fatal to the invocation
//! only, never to the process. No retries.

use async_trait::async_trait;
use tracing::{debug, error};

use crate::error::Error;

/// What a stage did with the chain.
pub enum StageOutcome<C> {
    /// Pass the context to the next stage.
    Continue(C),
    /// Stop and discard the chain. Expected control flow, not an error.
    Halt,
}

/// One unit of pipeline logic. Stages are structs holding whatever
/// configuration they close over (thresholds, windows, adapter handles),
/// so the same stage shape can be reused with different parameters.
#[async_trait]
pub trait Stage<C: Send + 'static>: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: C) -> Result<StageOutcome<C>, Error>;
}

/// How a pipeline invocation ended. Returned so callers and tests can
/// observe termination; the executor has already done the logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineRun {
    Completed,
    Halted { stage: &'static str },
    Failed { stage: &'static str },
}

/// Named ordered-stage runner.
pub struct Pipeline<C> {
    name: &'static str,
    stages: Vec<Box<dyn Stage<C>>>,
}

impl<C: Send + 'static> Pipeline<C> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            stages: Vec::new(),
        }
    }

    pub fn stage(mut self, stage: impl Stage<C> + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub async fn execute(&self, ctx: C) -> PipelineRun {
        debug!(pipeline = %self.name, "Pipeline started");
        let mut ctx = ctx;
        for stage in &self.stages {
            debug!(pipeline = %self.name, stage = %stage.name(), "Running stage");
            match stage.run(ctx).await {
                Ok(StageOutcome::Continue(next)) => ctx = next,
                Ok(StageOutcome::Halt) => {
                    debug!(pipeline = %self.name, stage = %stage.name(), "Pipeline halted");
                    return PipelineRun::Halted {
                        stage: stage.name(),
                    };
                }
                Err(e) => {
                    error!(
                        pipeline = %self.name,
                        stage = %stage.name(),
                        error = %e,
                        "Stage failed, abandoning invocation"
                    );
                    return PipelineRun::Failed {
                        stage: stage.name(),
                    };
                }
            }
        }
        debug!(pipeline = %self.name, "Pipeline completed");
        PipelineRun::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;

    struct Increment;

    #[async_trait]
    impl Stage<u32> for Increment {
        fn name(&self) -> &'static str {
            "increment"
        }

        async fn run(&self, ctx: u32) -> Result<StageOutcome<u32>, Error> {
            Ok(StageOutcome::Continue(ctx + 1))
        }
    }

    struct HaltBelow(u32);

    #[async_trait]
    impl Stage<u32> for HaltBelow {
        fn name(&self) -> &'static str {
            "halt_below"
        }

        async fn run(&self, ctx: u32) -> Result<StageOutcome<u32>, Error> {
            if ctx < self.0 {
                Ok(StageOutcome::Halt)
            } else {
                Ok(StageOutcome::Continue(ctx))
            }
        }
    }

    struct Explode;

    #[async_trait]
    impl Stage<u32> for Explode {
        fn name(&self) -> &'static str {
            "explode"
        }

        async fn run(&self, _ctx: u32) -> Result<StageOutcome<u32>, Error> {
            Err(Error::Chat(ChatError::SendFailed {
                reason: "boom".into(),
            }))
        }
    }

    #[tokio::test]
    async fn runs_stages_in_order() {
        let pipeline = Pipeline::new("test")
            .stage(Increment)
            .stage(Increment)
            .stage(HaltBelow(2));
        assert_eq!(pipeline.execute(0).await, PipelineRun::Completed);
    }

    #[tokio::test]
    async fn halt_short_circuits() {
        let pipeline = Pipeline::new("test")
            .stage(HaltBelow(10))
            .stage(Explode);
        // Explode never runs.
        assert_eq!(
            pipeline.execute(0).await,
            PipelineRun::Halted { stage: "halt_below" }
        );
    }

    #[tokio::test]
    async fn stage_error_abandons_invocation() {
        let pipeline = Pipeline::new("test")
            .stage(Increment)
            .stage(Explode)
            .stage(Increment);
        assert_eq!(
            pipeline.execute(0).await,
            PipelineRun::Failed { stage: "explode" }
        );
    }

    #[tokio::test]
    async fn empty_pipeline_completes() {
        let pipeline: Pipeline<u32> = Pipeline::new("empty");
        assert_eq!(pipeline.execute(0).await, PipelineRun::Completed);
    }
}
