//! Abstract transfer functions.
//!
//! One environment update per opcode, plus the conditional-branch
//! refinement that produces the two per-edge environments. Unsupported
//! shapes inside the closed opcode set degrade to "untracked" (sound);
//! shapes outside the analyzer's documented IR fragment abort the
//! procedure's analysis.

use crate::bounds::interval::Interval;
use crate::bounds::range_refine;
use crate::core::error::{AnalyzerError, Result};
use crate::core::ir::Procedure;
use crate::core::types::{CmpPred, InstKind, Operand, ValueId};
use crate::state::env::Env;

/// Interval of an operand: constants lift to singletons, values read the
/// environment.
pub fn operand_interval(env: &Env, operand: Operand) -> Option<Interval> {
    match operand {
        Operand::Const(c) => Some(Interval::constant(c)),
        Operand::Value(v) => env.get(v),
    }
}

/// Advance the environment through one non-terminator instruction.
pub fn apply(prog: &Procedure, value: ValueId, env: &mut Env) -> Result<()> {
    match &prog.inst(value).kind {
        InstKind::AllocScalar => {
            env.set(value, Interval::top());
        }
        // Array contents are not modeled; the element count is read off the
        // IR by the bounds verifier after the fixpoint.
        InstKind::AllocArray { .. } => {}
        InstKind::Load { ptr } => match prog.inst(*ptr).kind {
            InstKind::AllocScalar => {
                let interval = env
                    .get(*ptr)
                    .ok_or(AnalyzerError::UntrackedLoad(value.0))?;
                env.set(value, interval);
            }
            // Array element: unknown integer.
            InstKind::ElemAddr { .. } => {
                env.set(value, Interval::top());
            }
            _ => return Err(AnalyzerError::UntrackedLoad(value.0)),
        },
        InstKind::Store { value: stored, ptr } => match prog.inst(*ptr).kind {
            InstKind::AllocScalar => {
                // Strong update; an untracked stored value makes the slot
                // unknown rather than failing.
                let interval = operand_interval(env, *stored).unwrap_or_else(Interval::top);
                env.set(*ptr, interval);
            }
            // Array element: contents not modeled, nothing to update.
            InstKind::ElemAddr { .. } => {}
            _ => return Err(AnalyzerError::UntrackedStore(value.0)),
        },
        InstKind::BinOp { op, lhs, rhs } => {
            let li = operand_interval(env, *lhs)
                .ok_or(AnalyzerError::UntrackedOperand(value.0))?;
            let ri = operand_interval(env, *rhs)
                .ok_or(AnalyzerError::UntrackedOperand(value.0))?;
            env.set(value, li.apply(*op, ri)?);
        }
        // The refinement happens at the consuming conditional branch.
        InstKind::Cmp { .. } => {}
        // The produced address is not a tracked integer; the bounds
        // verifier inspects the index operand separately.
        InstKind::ElemAddr { .. } => {
            env.set(value, Interval::top());
        }
        InstKind::Call { .. } => {
            env.set(value, Interval::top());
        }
        InstKind::Cast { value: operand } => {
            if let Some(interval) = operand_interval(env, *operand) {
                env.set(value, interval);
            }
        }
        // Terminators have no environment effect; their edge behavior is
        // the fixpoint engine's business.
        InstKind::Br { .. } | InstKind::CondBr { .. } | InstKind::Ret { .. } => {}
    }
    Ok(())
}

/// The two per-edge environments produced by a conditional branch.
///
/// `None` means the corresponding edge is infeasible under the current
/// facts and must not receive an environment (pruning).
#[derive(Debug)]
pub struct BranchEnvs {
    /// Environment on the then edge, if reachable.
    pub then_env: Option<Env>,
    /// Environment on the else edge, if reachable.
    pub else_env: Option<Env>,
}

// One comparison side: the interval it contributes and, when the operand
// loads a scalar stack slot, the slot to write the refinement back into.
struct Side {
    interval: Interval,
    slot: Option<ValueId>,
}

fn resolve_side(prog: &Procedure, env: &Env, operand: Operand) -> Result<Side> {
    match operand {
        Operand::Const(c) => Ok(Side {
            interval: Interval::constant(c),
            slot: None,
        }),
        Operand::Value(v) => match prog.inst(v).kind {
            InstKind::Load { ptr } => {
                if matches!(prog.inst(ptr).kind, InstKind::AllocScalar) {
                    // Refine the slot itself: later loads read from there.
                    Ok(Side {
                        interval: env.get(ptr).unwrap_or_else(Interval::top),
                        slot: Some(ptr),
                    })
                } else {
                    // Load from an unmodeled cell: contributes its recorded
                    // range but there is no slot to refine.
                    Ok(Side {
                        interval: env.get(v).unwrap_or_else(Interval::top),
                        slot: None,
                    })
                }
            }
            _ => Err(AnalyzerError::CompareOperandNotLoad(v.0)),
        },
    }
}

fn refined_env(env: &Env, pred: CmpPred, lhs: &Side, rhs: &Side) -> Option<Env> {
    // The edge is reachable only if both sides admit the relation.
    let refined_l = range_refine::refine(pred, lhs.interval, rhs.interval)?;
    let refined_r = range_refine::refine(pred.swap(), rhs.interval, lhs.interval)?;

    let mut out = env.clone();
    if let Some(slot) = lhs.slot {
        out.set(slot, refined_l);
    }
    if let Some(slot) = rhs.slot {
        out.set(slot, refined_r);
    }
    Some(out)
}

/// Compute the refined environments for the two outgoing edges of a
/// conditional branch on `cond`.
///
/// A condition that is not a comparison refines nothing; both edges stay
/// reachable with the input environment.
pub fn branch_envs(prog: &Procedure, cond: ValueId, env: &Env) -> Result<BranchEnvs> {
    let (pred, lhs, rhs) = match prog.inst(cond).kind {
        InstKind::Cmp { pred, lhs, rhs } => (pred, lhs, rhs),
        _ => {
            return Ok(BranchEnvs {
                then_env: Some(env.clone()),
                else_env: Some(env.clone()),
            })
        }
    };

    let lhs_side = resolve_side(prog, env, lhs)?;
    let rhs_side = resolve_side(prog, env, rhs)?;

    Ok(BranchEnvs {
        then_env: refined_env(env, pred, &lhs_side, &rhs_side),
        else_env: refined_env(env, pred.negate(), &lhs_side, &rhs_side),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ir::ProcBuilder;
    use crate::core::types::AluOp;

    #[test]
    fn test_alloc_scalar_introduces_top() {
        let mut b = ProcBuilder::new("f");
        let slot = b.alloc_scalar();
        b.ret();
        let prog = b.finish().unwrap();

        let mut env = Env::new();
        apply(&prog, slot, &mut env).unwrap();
        assert_eq!(env.get(slot), Some(Interval::top()));
    }

    #[test]
    fn test_store_const_then_load_copies() {
        let mut b = ProcBuilder::new("f");
        let slot = b.alloc_scalar();
        let st = b.store(7, slot);
        let x = b.load(slot);
        b.ret();
        let prog = b.finish().unwrap();

        let mut env = Env::new();
        apply(&prog, slot, &mut env).unwrap();
        apply(&prog, st, &mut env).unwrap();
        assert_eq!(env.get(slot), Some(Interval::constant(7)));
        apply(&prog, x, &mut env).unwrap();
        assert_eq!(env.get(x), Some(Interval::constant(7)));
    }

    #[test]
    fn test_binop_combines_intervals() {
        let mut b = ProcBuilder::new("f");
        let slot = b.alloc_scalar();
        let x = b.load(slot);
        let sum = b.binop(AluOp::Add, x, 5);
        b.ret();
        let prog = b.finish().unwrap();

        let mut env = Env::new();
        env.set(slot, Interval::new(0, 10));
        apply(&prog, x, &mut env).unwrap();
        apply(&prog, sum, &mut env).unwrap();
        assert_eq!(env.get(sum), Some(Interval::new(5, 15)));
    }

    #[test]
    fn test_binop_untracked_operand_is_fatal() {
        let mut b = ProcBuilder::new("f");
        let slot = b.alloc_scalar();
        let x = b.load(slot);
        let sum = b.binop(AluOp::Add, x, 5);
        b.ret();
        let prog = b.finish().unwrap();

        // x never transferred, so it is untracked when the binop runs
        let mut env = Env::new();
        let err = apply(&prog, sum, &mut env).unwrap_err();
        assert_eq!(err, AnalyzerError::UntrackedOperand(sum.0));
        let _ = x;
    }

    #[test]
    fn test_load_through_array_element_is_top() {
        let mut b = ProcBuilder::new("f");
        let arr = b.alloc_array(10);
        let addr = b.index(arr, 3);
        let x = b.load(addr);
        b.ret();
        let prog = b.finish().unwrap();

        let mut env = Env::new();
        apply(&prog, arr, &mut env).unwrap();
        apply(&prog, addr, &mut env).unwrap();
        apply(&prog, x, &mut env).unwrap();
        assert_eq!(env.get(x), Some(Interval::top()));
    }

    #[test]
    fn test_store_through_array_element_is_noop() {
        let mut b = ProcBuilder::new("f");
        let arr = b.alloc_array(10);
        let addr = b.index(arr, 3);
        let st = b.store(1, addr);
        b.ret();
        let prog = b.finish().unwrap();

        let mut env = Env::new();
        apply(&prog, arr, &mut env).unwrap();
        apply(&prog, addr, &mut env).unwrap();
        let before = env.clone();
        apply(&prog, st, &mut env).unwrap();
        assert_eq!(env, before);
    }

    #[test]
    fn test_store_through_call_result_is_fatal() {
        let mut b = ProcBuilder::new("f");
        let p = b.call("opaque_ptr");
        let st = b.store(1, p);
        b.ret();
        let prog = b.finish().unwrap();

        let mut env = Env::new();
        apply(&prog, p, &mut env).unwrap();
        let err = apply(&prog, st, &mut env).unwrap_err();
        assert_eq!(err, AnalyzerError::UntrackedStore(st.0));
    }

    #[test]
    fn test_branch_refines_both_edges() {
        let mut b = ProcBuilder::new("f");
        let t = b.block();
        let e = b.block();
        let slot = b.alloc_scalar();
        let x = b.load(slot);
        let c = b.cmp(CmpPred::Lt, x, 30);
        b.cond_br(c, t, e);
        b.switch_to(t);
        b.ret();
        b.switch_to(e);
        b.ret();
        let prog = b.finish().unwrap();

        let mut env = Env::new();
        env.set(slot, Interval::new(0, 100));
        env.set(x, Interval::new(0, 100));

        let branches = branch_envs(&prog, c, &env).unwrap();
        let then_env = branches.then_env.unwrap();
        let else_env = branches.else_env.unwrap();
        assert_eq!(then_env.get(slot), Some(Interval::new(0, 29)));
        assert_eq!(else_env.get(slot), Some(Interval::new(30, 100)));
        // the loaded value itself is not refined, only the slot
        assert_eq!(then_env.get(x), Some(Interval::new(0, 100)));
    }

    #[test]
    fn test_branch_prunes_infeasible_edge() {
        let mut b = ProcBuilder::new("f");
        let t = b.block();
        let e = b.block();
        let slot = b.alloc_scalar();
        let x = b.load(slot);
        let c = b.cmp(CmpPred::Lt, x, 30);
        b.cond_br(c, t, e);
        b.switch_to(t);
        b.ret();
        b.switch_to(e);
        b.ret();
        let prog = b.finish().unwrap();

        let mut env = Env::new();
        env.set(slot, Interval::constant(0));
        env.set(x, Interval::constant(0));

        let branches = branch_envs(&prog, c, &env).unwrap();
        assert!(branches.then_env.is_some());
        assert!(branches.else_env.is_none()); // 0 >= 30 is impossible
    }

    #[test]
    fn test_branch_on_non_compare_keeps_both_edges() {
        let mut b = ProcBuilder::new("f");
        let t = b.block();
        let e = b.block();
        let c = b.call("flag");
        b.cond_br(c, t, e);
        b.switch_to(t);
        b.ret();
        b.switch_to(e);
        b.ret();
        let prog = b.finish().unwrap();

        let mut env = Env::new();
        apply(&prog, c, &mut env).unwrap();
        let branches = branch_envs(&prog, c, &env).unwrap();
        assert_eq!(branches.then_env, Some(env.clone()));
        assert_eq!(branches.else_env, Some(env));
    }

    #[test]
    fn test_compare_of_derived_value_is_fatal() {
        let mut b = ProcBuilder::new("f");
        let t = b.block();
        let e = b.block();
        let slot = b.alloc_scalar();
        let x = b.load(slot);
        let sum = b.binop(AluOp::Add, x, 1);
        let c = b.cmp(CmpPred::Lt, sum, 30);
        b.cond_br(c, t, e);
        b.switch_to(t);
        b.ret();
        b.switch_to(e);
        b.ret();
        let prog = b.finish().unwrap();

        let mut env = Env::new();
        env.set(slot, Interval::top());
        env.set(x, Interval::top());
        env.set(sum, Interval::top());

        let err = branch_envs(&prog, c, &env).unwrap_err();
        assert_eq!(err, AnalyzerError::CompareOperandNotLoad(sum.0));
    }
}
