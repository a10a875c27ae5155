//! Limit executor implementation.
//!
//! This executor limits the number of tuples returned from a child executor.

use crate::access::Tuple;
use crate::catalog::ColumnInfo;
use crate::executor::Executor;
use anyhow::{bail, Result};

/// Executor that limits the number of tuples returned
pub struct LimitExecutor {
    /// Child executor that produces tuples
    child: Box<dyn Executor>,
    /// Maximum number of tuples to return
    limit: usize,
    /// Number of tuples returned so far
    returned: usize,
    /// Whether the executor has been initialized
    initialized: bool,
}

impl LimitExecutor {
    /// Create a new limit executor
    ///
    /// # Arguments
    /// * `child` - The child executor that produces tuples
    /// * `limit` - The maximum number of tuples to return
    pub fn new(child: Box<dyn Executor>, limit: usize) -> Self {
        Self {
            child,
            limit,
            returned: 0,
            initialized: false,
        }
    }
}

impl Executor for LimitExecutor {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        self.child.init()?;
        self.returned = 0;
        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        // Stop pulling from the child once the limit is reached
        if self.returned >= self.limit {
            return Ok(None);
        }

        match self.child.next()? {
            Some(tuple) => {
                self.returned += 1;
                Ok(Some(tuple))
            }
            None => Ok(None),
        }
    }

    fn output_schema(&self) -> &[ColumnInfo] {
        self.child.output_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{DataType, RowId, Value};

    /// Produces `count` rows and records how many were pulled
    struct CountingExecutor {
        count: usize,
        pulled: std::sync::Arc<std::sync::atomic::AtomicUsize>,
        schema: Vec<ColumnInfo>,
    }

    impl Executor for CountingExecutor {
        fn init(&mut self) -> Result<()> {
            Ok(())
        }

        fn next(&mut self) -> Result<Option<Tuple>> {
            let pulled = self
                .pulled
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if pulled >= self.count {
                return Ok(None);
            }
            Ok(Some(Tuple::new(
                RowId(pulled as u64 + 1),
                vec![Value::Int32(pulled as i32)],
            )))
        }

        fn output_schema(&self) -> &[ColumnInfo] {
            &self.schema
        }
    }

    fn counting(
        count: usize,
    ) -> (
        Box<CountingExecutor>,
        std::sync::Arc<std::sync::atomic::AtomicUsize>,
    ) {
        let pulled = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let child = Box::new(CountingExecutor {
            count,
            pulled: pulled.clone(),
            schema: ColumnInfo::from_pairs(vec![("n", DataType::Int32)]),
        });
        (child, pulled)
    }

    #[test]
    fn test_limit_basic() -> Result<()> {
        let (child, _) = counting(5);
        let mut limit = LimitExecutor::new(child, 2);
        limit.init()?;

        assert_eq!(limit.next()?.unwrap().values, vec![Value::Int32(0)]);
        assert_eq!(limit.next()?.unwrap().values, vec![Value::Int32(1)]);
        assert!(limit.next()?.is_none());
        assert_eq!(limit.output_schema().len(), 1);
        Ok(())
    }

    #[test]
    fn test_limit_one_stops_pulling() -> Result<()> {
        let (child, pulled) = counting(100);
        let mut limit = LimitExecutor::new(child, 1);
        limit.init()?;

        assert!(limit.next()?.is_some());
        assert!(limit.next()?.is_none());
        assert_eq!(pulled.load(std::sync::atomic::Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn test_limit_larger_than_input() -> Result<()> {
        let (child, _) = counting(2);
        let mut limit = LimitExecutor::new(child, 10);
        limit.init()?;

        let mut rows = 0;
        while limit.next()?.is_some() {
            rows += 1;
        }
        assert_eq!(rows, 2);
        Ok(())
    }

    #[test]
    fn test_limit_zero() -> Result<()> {
        let (child, pulled) = counting(3);
        let mut limit = LimitExecutor::new(child, 0);
        limit.init()?;
        assert!(limit.next()?.is_none());
        assert_eq!(pulled.load(std::sync::atomic::Ordering::SeqCst), 0);
        Ok(())
    }
}
