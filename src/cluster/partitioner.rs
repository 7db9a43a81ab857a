use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Identifier of one cluster member (an execution target).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(pub String);

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maps keys to partitions and partitions to owning members.
pub struct PartitionManager {
    pub(crate) num_partitions: u32,
    members: Vec<MemberId>,
}

impl PartitionManager {
    pub fn new(mut members: Vec<MemberId>) -> Self {
        members.sort();
        Self {
            num_partitions: 256,
            members,
        }
    }

    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    pub fn get_partition(&self, key: &str) -> u32 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let hash = hasher.finish() as u32;
        hash % self.num_partitions
    }

    pub fn get_owner(&self, partition: u32) -> Option<&MemberId> {
        if self.members.is_empty() {
            return None;
        }
        let primary_idx = (partition as usize) % self.members.len();
        self.members.get(primary_idx)
    }

    /// Groups `items` by the member owning `key(item)`, in member order. Items
    /// are moved through unchanged; members owning none of them are left out.
    pub fn route_keys<T>(&self, items: Vec<T>, key: impl Fn(&T) -> String) -> Vec<(MemberId, Vec<T>)> {
        let mut routed: Vec<(MemberId, Vec<T>)> = self
            .members
            .iter()
            .map(|member| (member.clone(), Vec::new()))
            .collect();

        for item in items {
            let partition = self.get_partition(&key(&item));
            let Some(owner) = self.get_owner(partition) else {
                continue;
            };
            if let Some((_, owned)) = routed.iter_mut().find(|(member, _)| member == owner) {
                owned.push(item);
            }
        }

        routed.retain(|(_, owned)| !owned.is_empty());
        routed
    }
}
