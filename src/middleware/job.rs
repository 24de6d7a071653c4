use crate::object::Job;

use super::trim_resources;

pub struct JobPatcher {
    skip_resources: bool,
}

impl JobPatcher {
    pub fn new(skip_resources: bool) -> Self {
        Self { skip_resources }
    }

    #[tracing::instrument(skip_all, fields(job = %job.metadata.name))]
    pub fn patch(&self, job: &mut Job) {
        if !self.skip_resources {
            return;
        }

        trim_resources(&mut job.spec.template);
        tracing::debug!("trimmed container resources");
    }
}
