use crate::consumer::Consumer;
use crate::error::{PipelineError, Result};
use crate::logging;
use crate::producer::{BoundedQueueProducer, Producer};
use crate::service::Service;
use futures::future::join_all;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

struct Registration {
    payload: &'static str,
    producer: Box<dyn Any + Send + Sync>,
    consumer: Option<Box<dyn Any + Send + Sync>>,
    service: Arc<dyn Service>,
}

/// Process-wide wiring of pipelines, keyed by payload type.
///
/// Each payload type may have exactly one registered producer. Components that need to submit
/// work look their producer up by payload type, while the host starts and stops every
/// registered pipeline together. Pipelines registered with
/// [register_pipeline](Registry::register_pipeline) also expose their consumer.
#[derive(Default)]
pub struct Registry {
    pipelines: HashMap<TypeId, Registration>,
    order: Vec<TypeId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `producer` as the pipeline for payloads of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [PipelineError::DuplicatePipeline] if a pipeline for `T` is already registered.
    pub fn register<T, P>(&mut self, producer: Arc<P>) -> Result<()>
    where
        T: 'static,
        P: Producer<T> + Service + 'static,
    {
        let key = TypeId::of::<T>();
        let payload = type_name::<T>();

        if self.pipelines.contains_key(&key) {
            return Err(PipelineError::DuplicatePipeline(payload));
        }

        let handle: Arc<dyn Producer<T>> = producer.clone();

        self.pipelines.insert(
            key,
            Registration {
                payload,
                producer: Box::new(handle),
                consumer: None,
                service: producer,
            },
        );
        self.order.push(key);

        logging::registry::pipeline_registered(payload);
        Ok(())
    }

    /// Registers a [BoundedQueueProducer] together with the consumer it delivers to.
    ///
    /// # Errors
    ///
    /// Returns [PipelineError::DuplicatePipeline] if a pipeline for `T` is already registered.
    pub fn register_pipeline<T, C>(
        &mut self,
        producer: Arc<BoundedQueueProducer<T, Arc<C>>>,
    ) -> Result<()>
    where
        T: Send + 'static,
        C: Consumer<T> + 'static,
    {
        let consumer: Arc<dyn Consumer<T>> = producer.consumer().clone();
        self.register::<T, _>(producer)?;

        if let Some(registration) = self.pipelines.get_mut(&TypeId::of::<T>()) {
            registration.consumer = Some(Box::new(consumer));
        }

        Ok(())
    }

    /// Looks up the producer registered for payloads of type `T`.
    pub fn producer<T: 'static>(&self) -> Option<Arc<dyn Producer<T>>> {
        self.pipelines
            .get(&TypeId::of::<T>())?
            .producer
            .downcast_ref::<Arc<dyn Producer<T>>>()
            .cloned()
    }

    /// Looks up the consumer of the pipeline registered for payloads of type `T`, if it was
    /// registered with [register_pipeline](Registry::register_pipeline).
    pub fn consumer<T: 'static>(&self) -> Option<Arc<dyn Consumer<T>>> {
        self.pipelines
            .get(&TypeId::of::<T>())?
            .consumer
            .as_ref()?
            .downcast_ref::<Arc<dyn Consumer<T>>>()
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Starts every registered pipeline, in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered. Pipelines started before the failure keep running.
    pub fn start_all(&self) -> Result<()> {
        for registration in self.registrations() {
            registration.service.start().map_err(|err| {
                logging::registry::start_failed(registration.payload, &err);
                err
            })?;
        }

        Ok(())
    }

    /// Stops every registered pipeline concurrently, and waits for all of them to wind down.
    pub async fn stop_all(&self) {
        let stops = self
            .registrations()
            .map(|registration| registration.service.stop());

        join_all(stops).await;
    }

    fn registrations(&self) -> impl Iterator<Item = &Registration> {
        self.order.iter().filter_map(|key| self.pipelines.get(key))
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let payloads = self
            .registrations()
            .map(|registration| registration.payload)
            .collect::<Vec<_>>();

        f.debug_struct("Registry").field("pipelines", &payloads).finish()
    }
}
