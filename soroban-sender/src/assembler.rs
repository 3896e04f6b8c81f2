//! Merging simulation output into a transaction

use stellar_xdr::curr::{self as xdr, VecM};

use crate::error::{Error, Result};
use crate::node::SimulationResult;
use crate::transaction::{
    InvokeHostFunctionOp, Operation, OperationBody, Transaction, TransactionExt,
};

/// Produce a new transaction carrying the simulated resource data, resource fee and
/// authorizations. Neither input is modified.
///
/// Callers must reject simulations with more than one authorization entry beforehand.
pub fn assemble(
    tx: &Transaction,
    network_passphrase: &str,
    simulation: &SimulationResult,
) -> Result<Transaction> {
    if let Some(err) = &simulation.error {
        return Err(Error::SimulationFailed(err.clone()));
    }

    let operation = match tx.operations() {
        [op @ Operation {
            body:
                OperationBody::InvokeHostFunction(_)
                | OperationBody::ExtendFootprintTtl(_)
                | OperationBody::RestoreFootprint(_),
            ..
        }] => op,
        _ => {
            return Err(Error::Unsupported(
                "transaction: must contain exactly one invokeHostFunction, extendFootprintTtl \
                 or restoreFootprint operation"
                    .to_string(),
            ))
        }
    };

    let transaction_data = simulation.transaction_data.clone().ok_or_else(|| {
        Error::SimulationFailed("simulation returned no transaction data".to_string())
    })?;

    let body = match &operation.body {
        OperationBody::InvokeHostFunction(invoke) if invoke.auth.is_empty() => {
            let auth: VecM<_> = simulation.auth.clone().try_into().map_err(|err| {
                Error::SimulationFailed(format!("authorization entries: {}", err))
            })?;
            OperationBody::InvokeHostFunction(InvokeHostFunctionOp {
                host_function: invoke.host_function.clone(),
                auth,
            })
        }
        other => other.clone(),
    };

    let resource_fee = u64::try_from(simulation.min_resource_fee).unwrap_or(0);
    let fee = u32::try_from(u64::from(tx.fee()) + resource_fee).unwrap_or(u32::MAX);

    let operations: VecM<Operation, 100> = vec![Operation {
        source_account: operation.source_account.clone(),
        body,
    }]
    .try_into()
    .map_err(|err| Error::InvalidTransaction(format!("operations: {}", err)))?;

    let assembled = xdr::Transaction {
        fee,
        operations,
        ext: TransactionExt::V1(transaction_data),
        ..tx.xdr().clone()
    };

    Ok(Transaction::new(assembled, network_passphrase))
}
