// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{ExternalParameter, Node, Signature, TypeError, Typing};
use crate::types::{conversion_cost, Cost, CostTable, SupportedTypes, ValueType};

fn invalid(message: String) -> TypeError {
    TypeError::NotLogicallyValid(message)
}

fn narrow(
    params: &mut [ExternalParameter],
    id: usize,
    mask: SupportedTypes,
) -> Result<(), TypeError> {
    let param = params
        .get_mut(id)
        .ok_or_else(|| invalid(format!("unknown parameter #{id}")))?;
    let narrowed = param.supported & mask;
    if narrowed.is_empty() {
        return Err(invalid(format!(
            "parameter `{}` cannot be any of {:?}",
            param.name, mask
        )));
    }
    param.supported = narrowed;
    Ok(())
}

/// Whether the operands can produce every argument type of `sig`.
fn viable(sig: &Signature, operands: &[CostTable]) -> bool {
    sig.args
        .iter()
        .zip(operands)
        .all(|(t, costs)| costs.get(*t).is_some())
}

impl Typing {
    /// Cheapest overload for every type the node can produce.
    fn compute(&mut self, operands: &[CostTable]) -> Result<(), TypeError> {
        let mut costs = CostTable::new();
        for (choice, sig) in self.sigs.iter().enumerate() {
            let Some(total) = sig
                .args
                .iter()
                .zip(operands)
                .map(|(t, c)| c.get(*t).map(|c| c.cost))
                .sum::<Option<u32>>()
            else {
                continue;
            };
            for to in ValueType::CONCRETE {
                if let Some(conversion) = conversion_cost(sig.result, to) {
                    costs.offer(
                        to,
                        Cost {
                            cost: total + conversion,
                            internal: sig.result,
                            choice,
                        },
                    );
                }
            }
        }

        if costs.is_empty() {
            return Err(invalid("no overload accepts the operand types".to_string()));
        }
        self.costs = costs;
        Ok(())
    }

    /// The overload and target type picked by strong determination.
    pub(super) fn chosen(&self) -> Option<(ValueType, &Signature)> {
        let (target, choice) = self.chosen?;
        self.sigs.get(choice).map(|sig| (target, sig))
    }
}

impl Node {
    pub fn costs(&self, params: &[ExternalParameter]) -> CostTable {
        match self {
            Node::Constant { value, .. } => {
                CostTable::for_leaf(SupportedTypes::of(value.value_type()))
            }
            Node::Parameter { id } => CostTable::for_leaf(
                params
                    .get(*id)
                    .map_or(SupportedTypes::empty(), |p| p.supported),
            ),
            Node::Unary { typing, .. } | Node::Binary { typing, .. } | Node::Call { typing, .. } => {
                typing.costs
            }
        }
    }

    /// The type this node produces when nothing forces another one.
    pub fn returns(&self, params: &[ExternalParameter]) -> ValueType {
        self.costs(params).preferred().unwrap_or_default()
    }

    /// Recompute cost tables bottom-up after parameters have changed.
    pub fn refresh(&mut self, params: &[ExternalParameter]) -> Result<(), TypeError> {
        let Some((typing, mut operands)) = self.parts_mut() else {
            return Ok(());
        };
        for operand in operands.iter_mut() {
            operand.refresh(params)?;
        }
        let costs: Vec<_> = operands.iter().map(|o| o.costs(params)).collect();
        typing.compute(&costs)
    }

    /// Narrow the node to types in `mask`, dropping overloads that cannot
    /// produce any of them and narrowing operands accordingly.
    pub fn determine_weakly(
        &mut self,
        mask: SupportedTypes,
        params: &mut [ExternalParameter],
    ) -> Result<(), TypeError> {
        match self {
            Node::Constant { value, text } => {
                let reachable = CostTable::for_leaf(SupportedTypes::of(value.value_type()));
                if (reachable.supported() & mask).is_empty() {
                    return Err(invalid(format!("`{text}` cannot be any of {mask:?}")));
                }
                Ok(())
            }
            Node::Parameter { id } => narrow(params, *id, mask.sources()),
            node => {
                let Some((typing, mut operands)) = node.parts_mut() else {
                    return Ok(());
                };
                for operand in operands.iter_mut() {
                    operand.refresh(params)?;
                }
                let costs: Vec<_> = operands.iter().map(|o| o.costs(params)).collect();

                typing.sigs.retain(|sig| {
                    viable(sig, &costs)
                        && mask
                            .types()
                            .any(|t| conversion_cost(sig.result, t).is_some())
                });
                if typing.sigs.is_empty() {
                    return Err(invalid(format!(
                        "no overload produces any of {mask:?} from the operand types"
                    )));
                }

                for (i, operand) in operands.iter_mut().enumerate() {
                    let operand_mask = typing
                        .sigs
                        .iter()
                        .fold(SupportedTypes::empty(), |acc, sig| {
                            acc | SupportedTypes::of(sig.args[i])
                        });
                    operand.determine_weakly(operand_mask, params)?;
                }

                let costs: Vec<_> = operands.iter().map(|o| o.costs(params)).collect();
                typing.compute(&costs)
            }
        }
    }

    /// Force the node to produce `target`, choosing the cheapest overload and
    /// forcing operands to that overload's argument types.
    pub fn determine_strongly(
        &mut self,
        target: ValueType,
        params: &mut [ExternalParameter],
    ) -> Result<(), TypeError> {
        match self {
            Node::Constant { value, text } => {
                if conversion_cost(value.value_type(), target).is_none() {
                    return Err(invalid(format!("`{text}` cannot be {target}")));
                }
                Ok(())
            }
            Node::Parameter { id } => narrow(params, *id, SupportedTypes::of(target).sources()),
            node => {
                let Some((typing, mut operands)) = node.parts_mut() else {
                    return Ok(());
                };
                let cost = typing
                    .costs
                    .get(target)
                    .ok_or_else(|| invalid(format!("no overload produces {target}")))?;
                let sig = typing
                    .sigs
                    .get(cost.choice)
                    .cloned()
                    .ok_or_else(|| invalid(format!("overload #{} vanished", cost.choice)))?;
                typing.chosen = Some((target, cost.choice));

                for (operand, t) in operands.iter_mut().zip(sig.args) {
                    operand.determine_strongly(t, params)?;
                }
                Ok(())
            }
        }
    }
}
