//! Unique name resolution and bucket provisioning
//!
//! Bucket names are global, so the base names may already be taken by
//! anyone. Both buckets share one readable suffix so they stay recognizable
//! as a pair.

use bucket_notify_common::defaults::{
    FUNCTION_BASE_NAME, INPUT_BUCKET_BASE_NAME, MAX_NAME_ATTEMPTS, OUTPUT_BUCKET_BASE_NAME,
};
use bucket_notify_common::naming::suffixed;
use bucket_notify_common::ops::{bucket_exists, function_exists};
use bucket_notify_common::{
    ApiError, BucketOperations, FunctionOperations, Settings, Suffix, generate_suffix,
};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

/// Base names the resolver starts from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseNames {
    pub input_bucket: String,
    pub output_bucket: String,
    pub function: String,
}

impl Default for BaseNames {
    fn default() -> Self {
        Self {
            input_bucket: INPUT_BUCKET_BASE_NAME.to_string(),
            output_bucket: OUTPUT_BUCKET_BASE_NAME.to_string(),
            function: FUNCTION_BASE_NAME.to_string(),
        }
    }
}

/// Outcome of the bucket name search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketNameResolution {
    /// Both names were free on the last probe
    Resolved {
        input: String,
        output: String,
        /// Shared suffix, `None` if the base names were free
        suffix: Option<Suffix>,
        attempts: u32,
    },
    /// Every attempt hit at least one taken name
    Exhausted { attempts: u32 },
}

/// Errors from provisioning
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No free bucket names found after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Find a pair of free bucket names.
///
/// The first attempt uses the base names; each later attempt applies a
/// fresh shared suffix. The output name is only probed when the input name
/// is free.
pub async fn resolve_bucket_names<B, R>(
    buckets: &B,
    base: &BaseNames,
    rng: &mut R,
    max_attempts: u32,
) -> Result<BucketNameResolution, ApiError>
where
    B: BucketOperations,
    R: Rng + ?Sized,
{
    let mut suffix: Option<Suffix> = None;
    for attempt in 1..=max_attempts {
        let input = suffixed(&base.input_bucket, suffix.as_ref());
        let output = suffixed(&base.output_bucket, suffix.as_ref());

        if !bucket_exists(buckets, &input).await? && !bucket_exists(buckets, &output).await? {
            return Ok(BucketNameResolution::Resolved {
                input,
                output,
                suffix,
                attempts: attempt,
            });
        }

        debug!(attempt, input = %input, output = %output, "Bucket name taken");
        suffix = Some(generate_suffix(rng));
    }

    Ok(BucketNameResolution::Exhausted {
        attempts: max_attempts,
    })
}

/// Pick the function name.
///
/// A taken base name gets the bucket suffix, or a fresh one if the buckets
/// needed none. The suffixed name is not re-probed.
pub async fn resolve_function_name<F, R>(
    functions: &F,
    base: &str,
    bucket_suffix: Option<&Suffix>,
    rng: &mut R,
) -> Result<String, ApiError>
where
    F: FunctionOperations,
    R: Rng + ?Sized,
{
    if !function_exists(functions, base).await? {
        return Ok(base.to_string());
    }
    let suffix = match bucket_suffix {
        Some(s) => s.clone(),
        None => generate_suffix(rng),
    };
    debug!(function = %base, suffix = %suffix, "Function name taken");
    Ok(suffix.apply(base))
}

/// Resolve all three names and create both buckets.
///
/// Nothing is created if the bucket name search is exhausted.
#[tracing::instrument(skip_all, fields(input = %base.input_bucket, output = %base.output_bucket))]
pub async fn provision<B, F, R>(
    buckets: &B,
    functions: &F,
    base: &BaseNames,
    rng: &mut R,
) -> Result<Settings, ResolveError>
where
    B: BucketOperations,
    F: FunctionOperations,
    R: Rng + ?Sized,
{
    let (input, output, suffix) =
        match resolve_bucket_names(buckets, base, rng, MAX_NAME_ATTEMPTS).await? {
            BucketNameResolution::Resolved {
                input,
                output,
                suffix,
                attempts,
            } => {
                info!(input = %input, output = %output, attempts, "Resolved bucket names");
                (input, output, suffix)
            }
            BucketNameResolution::Exhausted { attempts } => {
                return Err(ResolveError::Exhausted { attempts });
            }
        };

    let function = resolve_function_name(functions, &base.function, suffix.as_ref(), rng).await?;
    info!(function = %function, "Resolved function name");

    buckets.create_bucket(&input, None).await?;
    buckets.create_bucket(&output, None).await?;

    Ok(Settings::new(function, input, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bucket_notify_common::naming::is_valid_suffix;
    use bucket_notify_common::{Notifications, ObjectPage, ResourceKind};
    use bucket_notify_test_utils::{BucketCall, FakeBuckets, FakeFunctions, FunctionCall};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Every bucket name is taken
    #[derive(Default)]
    struct AllTaken {
        probes: AtomicU32,
        creates: AtomicU32,
    }

    impl BucketOperations for AllTaken {
        async fn probe_bucket(&self, _bucket: &str) -> Result<(), ApiError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn read_bucket(&self, _bucket: &str) -> Result<Notifications, ApiError> {
            Ok(Notifications::default())
        }

        async fn create_bucket(&self, bucket: &str, _: Option<Notifications>) -> Result<(), ApiError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            Err(ApiError::conflict(ResourceKind::Bucket, bucket))
        }

        async fn update_notifications(&self, _: &str, _: Notifications) -> Result<(), ApiError> {
            Ok(())
        }

        async fn list_objects(&self, _: &str, _: Option<String>) -> Result<ObjectPage, ApiError> {
            Ok(ObjectPage::default())
        }

        async fn delete_object(&self, _: &str, _: &str) -> Result<(), ApiError> {
            Ok(())
        }

        async fn delete_bucket(&self, _: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[tokio::test]
    async fn free_base_names_are_kept() {
        let buckets = FakeBuckets::new();
        let resolution = resolve_bucket_names(&buckets, &BaseNames::default(), &mut rng(), 25)
            .await
            .unwrap();

        assert_eq!(
            resolution,
            BucketNameResolution::Resolved {
                input: INPUT_BUCKET_BASE_NAME.to_string(),
                output: OUTPUT_BUCKET_BASE_NAME.to_string(),
                suffix: None,
                attempts: 1,
            }
        );
    }

    #[tokio::test]
    async fn collision_applies_one_shared_suffix() {
        let buckets = FakeBuckets::new().with_bucket(OUTPUT_BUCKET_BASE_NAME);
        let resolution = resolve_bucket_names(&buckets, &BaseNames::default(), &mut rng(), 25)
            .await
            .unwrap();

        let BucketNameResolution::Resolved {
            input,
            output,
            suffix: Some(suffix),
            attempts,
        } = resolution
        else {
            panic!("expected a suffixed resolution, got {resolution:?}");
        };
        assert!(is_valid_suffix(&suffix));
        assert_eq!(input, format!("{INPUT_BUCKET_BASE_NAME}-{suffix}"));
        assert_eq!(output, format!("{OUTPUT_BUCKET_BASE_NAME}-{suffix}"));
        assert_eq!(attempts, 2);
        assert!(!buckets.has_bucket(&input));
        assert!(!buckets.has_bucket(&output));
    }

    #[tokio::test]
    async fn taken_input_skips_output_probe() {
        let buckets = FakeBuckets::new().with_bucket(INPUT_BUCKET_BASE_NAME);
        resolve_bucket_names(&buckets, &BaseNames::default(), &mut rng(), 25)
            .await
            .unwrap();

        assert_eq!(
            buckets.calls()[0],
            BucketCall::Probe(INPUT_BUCKET_BASE_NAME.to_string())
        );
        assert!(!buckets.calls().contains(&BucketCall::Probe(OUTPUT_BUCKET_BASE_NAME.to_string())));
    }

    #[tokio::test]
    async fn exhaustion_after_exact_attempt_count() {
        let buckets = AllTaken::default();
        let resolution = resolve_bucket_names(&buckets, &BaseNames::default(), &mut rng(), 25)
            .await
            .unwrap();

        assert_eq!(resolution, BucketNameResolution::Exhausted { attempts: 25 });
        assert_eq!(buckets.probes.load(Ordering::SeqCst), 25);
    }

    #[tokio::test]
    async fn exhausted_provision_creates_nothing() {
        let buckets = AllTaken::default();
        let functions = FakeFunctions::new();

        let err = provision(&buckets, &functions, &BaseNames::default(), &mut rng())
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::Exhausted { attempts: 25 }));
        assert_eq!(buckets.creates.load(Ordering::SeqCst), 0);
        assert!(functions.calls().is_empty());
    }

    #[tokio::test]
    async fn probe_failure_is_returned_unchanged() {
        let buckets = FakeBuckets::new().fail_on(
            bucket_notify_test_utils::BucketOp::Probe,
            INPUT_BUCKET_BASE_NAME,
            ApiError::other("access denied"),
        );
        let err = resolve_bucket_names(&buckets, &BaseNames::default(), &mut rng(), 25)
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::other("access denied"));
    }

    #[tokio::test]
    async fn taken_function_reuses_bucket_suffix() {
        let functions = FakeFunctions::new().with_function(FUNCTION_BASE_NAME);
        let suffix = Suffix::new("bakodire");

        let name = resolve_function_name(&functions, FUNCTION_BASE_NAME, Some(&suffix), &mut rng())
            .await
            .unwrap();

        assert_eq!(name, format!("{FUNCTION_BASE_NAME}-bakodire"));
        assert_eq!(functions.calls(), [FunctionCall::Read(FUNCTION_BASE_NAME.to_string())]);
    }

    #[tokio::test]
    async fn taken_function_without_bucket_suffix_gets_fresh_one() {
        let functions = FakeFunctions::new().with_function(FUNCTION_BASE_NAME);

        let name = resolve_function_name(&functions, FUNCTION_BASE_NAME, None, &mut rng())
            .await
            .unwrap();

        let suffix = name
            .strip_prefix(&format!("{FUNCTION_BASE_NAME}-"))
            .expect("suffixed name");
        assert!(is_valid_suffix(suffix));
    }

    #[tokio::test]
    async fn provision_creates_both_buckets_and_settings() {
        let buckets = FakeBuckets::new();
        let functions = FakeFunctions::new();

        let settings = provision(&buckets, &functions, &BaseNames::default(), &mut rng())
            .await
            .unwrap();

        assert_eq!(
            settings,
            Settings::new(FUNCTION_BASE_NAME, INPUT_BUCKET_BASE_NAME, OUTPUT_BUCKET_BASE_NAME)
        );
        assert!(buckets.has_bucket(INPUT_BUCKET_BASE_NAME));
        assert!(buckets.has_bucket(OUTPUT_BUCKET_BASE_NAME));
        assert!(!functions.has_function(FUNCTION_BASE_NAME));
    }
}
