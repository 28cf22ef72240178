//! Bounded-wait element lookups
//!
//! The rendered document fills in asynchronously, so "not there yet" is an ordinary
//! outcome. Lookups poll the client until the element shows up or the wait runs
//! out and report absence as `None`. Detached (stale) elements count as absent.
//! Only failures of the session itself come back as errors.

use crate::browser::{ElementRef, RenderClient, Scope, Selector};
use crate::error::Result;
use std::time::Duration;

/// How long to keep probing and how often
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Wait {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self { timeout, poll_interval }
    }

    /// Number of probes that fit in the timeout, counting the immediate first one
    ///
    /// Waiting is counted in polls rather than wall-clock time so that clients whose
    /// `pause` is free (fakes) time out after the same number of probes.
    pub fn polls(&self) -> u32 {
        let interval = self.poll_interval.as_millis().max(1);
        let extra = self.timeout.as_millis().div_ceil(interval);
        u32::try_from(extra).unwrap_or(u32::MAX - 1) + 1
    }
}

/// Poll `probe` until it yields `Some`, sleeping through the client between probes
pub fn poll_until<C, T, F>(client: &C, wait: Wait, mut probe: F) -> Result<Option<T>>
where
    C: RenderClient + ?Sized,
    F: FnMut() -> Result<Option<T>>,
{
    let polls = wait.polls();
    for poll in 0..polls {
        match probe() {
            Ok(Some(found)) => return Ok(Some(found)),
            Ok(None) => {}
            Err(e) if e.is_stale() => log::debug!("Stale element while polling: {}", e),
            Err(e) => return Err(e),
        }
        if poll + 1 < polls {
            client.pause(wait.poll_interval);
        }
    }
    Ok(None)
}

/// Wait for `selector` to be present within `scope`
pub fn locate<C: RenderClient + ?Sized>(
    client: &C,
    scope: Scope<'_>,
    selector: &Selector,
    wait: Wait,
) -> Result<Option<ElementRef>> {
    let found = poll_until(client, wait, || client.find(scope, selector))?;
    match found {
        Some(_) => log::debug!("Element found: {}", selector),
        None => log::debug!("Timeout waiting for element: {}", selector),
    }
    Ok(found)
}

/// Wait for `selector` to be present, displayed and enabled
pub fn locate_clickable<C: RenderClient + ?Sized>(
    client: &C,
    selector: &Selector,
    wait: Wait,
) -> Result<Option<ElementRef>> {
    poll_until(client, wait, || match client.find(Scope::Document, selector)? {
        Some(el) if client.is_clickable(&el)? => Ok(Some(el)),
        _ => Ok(None),
    })
}
