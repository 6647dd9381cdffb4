//! Moving stock from one owner to another.
//!
//! Two owners never share a ledger, so a move is a retrieve from the source
//! followed by a store into the destination. If the store fails the amount
//! is put back into the source. This is compensation, not a transaction:
//! between the two calls the amount is held by neither owner.

use stockroom_ledger::StorageError;
use stockroom_types::{Kg, ResourceId};

use crate::store::CapacityStore;

/// Errors from [`transfer`], tagged with the side that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// The source could not supply the amount. Nothing moved.
    #[error("source refused: {0}")]
    Source(StorageError),

    /// The destination could not accept the amount. The amount was stored
    /// back into the source, which holds as much of the resource as before,
    /// though not necessarily in the same slots.
    #[error("destination refused: {0}")]
    Destination(StorageError),

    /// The destination refused and the amount could not be put back into
    /// the source either. The amount is lost from both owners; the caller
    /// must reconcile.
    #[error("destination refused ({destination}) and compensation failed ({compensation})")]
    Compensation {
        /// Why the destination refused.
        destination: StorageError,
        /// Why the source could not take the amount back.
        compensation: StorageError,
    },
}

/// Move `amount` of `resource` from `source` to `destination`.
///
/// # Errors
///
/// Returns a [`TransferError`] naming the side that failed. On
/// [`TransferError::Source`] nothing changed. On
/// [`TransferError::Destination`] the destination is unchanged and the
/// source's `stored(resource)` equals its value before the call. The
/// compensating store fills dedicated capacity first, so stock that came
/// out of the phase slot may come back into type capacity.
pub fn transfer(
    source: &mut CapacityStore,
    destination: &mut CapacityStore,
    resource: ResourceId,
    amount: Kg,
) -> Result<(), TransferError> {
    source
        .retrieve(resource, amount)
        .map_err(TransferError::Source)?;

    if let Err(destination_err) = destination.store(resource, amount) {
        return match source.store(resource, amount) {
            Ok(()) => Err(TransferError::Destination(destination_err)),
            Err(compensation) => {
                tracing::error!(
                    from = %source.owner(),
                    to = %destination.owner(),
                    %resource,
                    %amount,
                    %compensation,
                    "Transfer compensation failed; amount lost from both owners"
                );
                Err(TransferError::Compensation {
                    destination: destination_err,
                    compensation,
                })
            }
        };
    }

    tracing::debug!(
        from = %source.owner(),
        to = %destination.owner(),
        %resource,
        %amount,
        "Transferred resource"
    );
    Ok(())
}
