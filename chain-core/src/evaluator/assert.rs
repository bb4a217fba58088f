//! Assert evaluator

use super::{EvalContext, Evaluator};
use crate::error::{ensure, Result, ValidationError};
use crate::operations::{AssertOperation, Predicate};
use crate::store::LedgerStore;
use crate::transaction::OperationResult;

/// Evaluator for [`AssertOperation`]
#[derive(Debug, Clone, Copy, Default)]
pub struct AssertEvaluator;

fn check_predicate<S: LedgerStore>(store: &S, predicate: &Predicate) -> Result<()> {
    match predicate {
        Predicate::AccountNameEqLit { account_id, name } => {
            let account = store.get_account(*account_id)?;
            ensure!(
                &account.name == name,
                ValidationError::PredicateFailed(format!(
                    "account {} is named '{}', not '{}'",
                    account_id, account.name, name
                ))
            );
        }
        Predicate::AssetSymbolEqLit { asset_id, symbol } => {
            let asset = store.get_asset(*asset_id)?;
            ensure!(
                &asset.symbol == symbol,
                ValidationError::PredicateFailed(format!(
                    "asset {} has symbol '{}', not '{}'",
                    asset_id, asset.symbol, symbol
                ))
            );
        }
        Predicate::BlockId { id } => {
            let known = id
                .block_num()
                .and_then(|num| store.block_summary((num & 0xffff) as u16))
                .map_or(false, |summary| summary == id);
            ensure!(
                known,
                ValidationError::PredicateFailed(format!("block {} is not in the chain", id.0))
            );
        }
    }
    Ok(())
}

impl Evaluator for AssertEvaluator {
    type Op = AssertOperation;
    type Receipt = ();

    fn evaluate<S: LedgerStore>(
        &self,
        store: &S,
        _ctx: &EvalContext,
        op: &AssertOperation,
    ) -> Result<()> {
        let params = store.chain_parameters();
        if params.skip_assert_evaluation {
            return Ok(());
        }
        for predicate in &op.predicates {
            ensure!(
                predicate.opcode() < params.max_predicate_opcode,
                ValidationError::invalid(format!(
                    "predicate opcode {} is not supported",
                    predicate.opcode()
                ))
            );
            check_predicate(store, predicate)?;
        }
        Ok(())
    }

    fn apply<S: LedgerStore>(
        &self,
        _store: &mut S,
        _ctx: &EvalContext,
        _op: &AssertOperation,
        _receipt: (),
    ) -> Result<OperationResult> {
        Ok(OperationResult::Void)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainParameters;
    use crate::store::InMemoryStore;
    use crate::types::{AccountId, Asset, BlockId, PublicKey, CORE_ASSET};
    use chrono::Utc;

    fn assert_op(predicates: Vec<Predicate>) -> AssertOperation {
        AssertOperation {
            fee: Asset::zero(CORE_ASSET),
            fee_paying_account: AccountId::new(0),
            predicates,
            required_auths: Default::default(),
        }
    }

    fn name_is(name: &str) -> Predicate {
        Predicate::AccountNameEqLit {
            account_id: AccountId::new(0),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_account_name_predicate() {
        let mut store = InMemoryStore::default();
        store.create_account("alice", PublicKey::new("k"));
        let ctx = EvalContext::resolve(&store);

        assert!(AssertEvaluator
            .evaluate(&store, &ctx, &assert_op(vec![name_is("alice")]))
            .is_ok());
        let err = AssertEvaluator
            .evaluate(&store, &ctx, &assert_op(vec![name_is("bob")]))
            .unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::PredicateFailed(_))
        ));
    }

    #[test]
    fn test_block_id_predicate_uses_summary_slot() {
        let mut store = InMemoryStore::default();
        // block 0x10005 lands in slot 5
        let id = BlockId("00010005deadbeef".to_string());
        store.push_block(0x10005, id.clone(), Utc::now());
        let ctx = EvalContext::resolve(&store);

        assert!(AssertEvaluator
            .evaluate(&store, &ctx, &assert_op(vec![Predicate::BlockId { id }]))
            .is_ok());

        let other = BlockId("00000005cafebabe".to_string());
        assert!(AssertEvaluator
            .evaluate(&store, &ctx, &assert_op(vec![Predicate::BlockId { id: other }]))
            .is_err());
    }

    #[test]
    fn test_opcode_limit_and_skip_flag() {
        let mut store = InMemoryStore::new(ChainParameters {
            max_predicate_opcode: 1,
            ..Default::default()
        });
        store.create_account("alice", PublicKey::new("k"));
        let ctx = EvalContext::resolve(&store);
        let block = Predicate::BlockId {
            id: BlockId("00000001".to_string()),
        };

        let err = AssertEvaluator
            .evaluate(&store, &ctx, &assert_op(vec![name_is("alice"), block]))
            .unwrap_err();
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::InvalidOperation(_))
        ));

        store.set_chain_parameters(ChainParameters {
            skip_assert_evaluation: true,
            ..Default::default()
        });
        assert!(AssertEvaluator
            .evaluate(&store, &ctx, &assert_op(vec![name_is("bob")]))
            .is_ok());
    }
}
