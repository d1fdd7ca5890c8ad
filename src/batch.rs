//! Batch removal over a root or view range.
//!
//! Removing many elements one `remove_at` call at a time would re-walk the
//! chain and re-synchronize every sibling view per element. The batch
//! protocol instead makes a single pass over the target range, splices out
//! whole runs of doomed nodes, and settles every registered view once from
//! sorted endpoint events.
//!
//! Per view there are four interesting root positions:
//!
//! - its *lead* (`offset`): once the scan passes it, the removals seen so
//!   far are exactly the removals before the view, which is its offset
//!   correction;
//! - its *trail* (`offset + len`): the removals seen between lead and trail
//!   are the removals inside the view, which is its length correction;
//! - its front boundary node's position (`offset - 1`): if that node is
//!   removed, the front must be rewritten to the nearest survivor before it;
//! - its back boundary node's position (`offset + len`): if that node is
//!   removed, the back must be rewritten to the nearest survivor after it.
//!
//! Each list is sorted once and consumed by a monotone cursor, so the whole
//! operation is one range walk plus `O(v log v)` setup for `v` views.

use smallvec::SmallVec;

use crate::event::Change;
use crate::list::ViewList;
use crate::{Error, ViewKey};

struct EndpointRec {
    slot: usize,
    lead: usize,
    trail: usize,
    /// Removal count captured when the scan passed the lead.
    lead_r: usize,
}

impl<T> ViewList<T> {
    /// Removes every element of the target for which `pred` returns `true`.
    ///
    /// Returns the number of removed elements. All sibling views are settled
    /// in the same pass.
    pub fn remove_all<F>(&mut self, key: ViewKey, pred: F) -> Result<usize, Error>
    where
        F: FnMut(&T) -> bool,
    {
        self.batch_remove(key, pred)
    }

    /// Keeps only the elements of the target for which `pred` returns
    /// `true`. Returns the number of removed elements.
    pub fn retain<F>(&mut self, key: ViewKey, mut pred: F) -> Result<usize, Error>
    where
        F: FnMut(&T) -> bool,
    {
        self.batch_remove(key, move |value| !pred(value))
    }

    /// Removes occurrences of `items` from the target with bag semantics:
    /// each entry in `items` accounts for at most one removal, so removing
    /// `[7, 7]` from `[7, 7, 7]` leaves one `7`.
    pub fn remove_items(&mut self, key: ViewKey, items: &[T]) -> Result<usize, Error>
    where
        T: PartialEq,
    {
        let mut used = vec![false; items.len()];
        self.batch_remove(key, move |value| {
            for (i, item) in items.iter().enumerate() {
                if !used[i] && item == value {
                    used[i] = true;
                    return true;
                }
            }
            false
        })
    }

    pub(crate) fn batch_remove<F>(&mut self, key: ViewKey, mut doomed: F) -> Result<usize, Error>
    where
        F: FnMut(&T) -> bool,
    {
        let target = self.resolve(key)?;
        let e = self.extent(target);
        self.stamp += 1;

        // Sorted endpoint events. Lead/trail settle offsets and lengths,
        // fronts/backs rewrite boundary nodes that get removed.
        let mut recs: Vec<EndpointRec> = self
            .views
            .iter()
            .map(|(slot, v)| EndpointRec {
                slot,
                lead: v.offset,
                trail: v.offset + v.len,
                lead_r: 0,
            })
            .collect();
        let mut by_lead: Vec<usize> = (0..recs.len()).collect();
        by_lead.sort_unstable_by_key(|&i| recs[i].lead);
        let mut by_trail: Vec<usize> = (0..recs.len()).collect();
        by_trail.sort_unstable_by_key(|&i| recs[i].trail);
        let mut fronts: Vec<(usize, usize)> = self
            .views
            .iter()
            .filter(|(_, v)| v.offset > 0)
            .map(|(slot, v)| (v.offset - 1, slot))
            .collect();
        fronts.sort_unstable();
        let mut backs: Vec<(usize, usize)> = self
            .views
            .iter()
            .map(|(slot, v)| (v.offset + v.len, slot))
            .collect();
        backs.sort_unstable();

        let (mut lcur, mut tcur, mut fcur, mut bcur) = (0, 0, 0, 0);

        let mut listener = self.listener.take();
        let mut removed = 0usize;
        let mut node = self.chain.next(e.front);
        // Last surviving node seen so far; runs of removed nodes are spliced
        // out against it.
        let mut survivor = e.front;
        let mut pending_backs: SmallVec<[usize; 4]> = SmallVec::new();

        for i in 0..e.len {
            let idx = e.offset + i;

            // Leads before trails at equal positions, so a zero-length view
            // settles with both corrections from the same snapshot.
            while lcur < by_lead.len() && recs[by_lead[lcur]].lead <= idx {
                recs[by_lead[lcur]].lead_r = removed;
                lcur += 1;
            }
            while tcur < by_trail.len() && recs[by_trail[tcur]].trail <= idx {
                let rec = &recs[by_trail[tcur]];
                let v = &mut self.views[rec.slot];
                v.offset -= rec.lead_r;
                v.len -= removed - rec.lead_r;
                tcur += 1;
            }

            let next = self.chain.next(node);
            if doomed(self.chain.value(node)) {
                while fcur < fronts.len() && fronts[fcur].0 < idx {
                    fcur += 1;
                }
                while fcur < fronts.len() && fronts[fcur].0 == idx {
                    let slot = fronts[fcur].1;
                    if self.views[slot].front == node {
                        self.views[slot].front = survivor;
                    }
                    fcur += 1;
                }
                while bcur < backs.len() && backs[bcur].0 < idx {
                    bcur += 1;
                }
                while bcur < backs.len() && backs[bcur].0 == idx {
                    let slot = backs[bcur].1;
                    if self.views[slot].back == node {
                        pending_backs.push(slot);
                    }
                    bcur += 1;
                }

                let value = self.chain.remove_detached(node);
                // The index a one-at-a-time removal sequence would report.
                let report = idx - removed;
                removed += 1;
                if let Some(cb) = listener.as_mut() {
                    cb(Change::Removed {
                        index: report,
                        value: &value,
                    });
                }
            } else {
                // Survivor closes any open run: splice it out and give the
                // waiting back boundaries their nearest survivor.
                self.chain.relink(survivor, node);
                for slot in pending_backs.drain(..) {
                    self.views[slot].back = node;
                }
                survivor = node;
            }
            node = next;
        }

        // Close the final run against the range's back boundary, which is
        // outside the scan and therefore always survives.
        self.chain.relink(survivor, e.back);
        for slot in pending_backs.drain(..) {
            self.views[slot].back = e.back;
        }

        // Endpoints past the scanned range settle with the final count.
        while lcur < by_lead.len() {
            recs[by_lead[lcur]].lead_r = removed;
            lcur += 1;
        }
        while tcur < by_trail.len() {
            let rec = &recs[by_trail[tcur]];
            let v = &mut self.views[rec.slot];
            v.offset -= rec.lead_r;
            v.len -= removed - rec.lead_r;
            tcur += 1;
        }

        self.chain.shrink(removed);
        self.listener = listener;
        Ok(removed)
    }
}
