pub type NodeId = usize;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    pub key: i64,
    // invariant: `aggregate == sum(left) + key + sum(right)`
    pub aggregate: i128,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    // Non-owning; `None` on the root of a tree.
    pub parent: Option<NodeId>,
}

impl Node {
    pub fn new(key: i64) -> Self {
        Self {
            key,
            aggregate: key as i128,
            left: None,
            right: None,
            parent: None,
        }
    }

    pub fn arm(&self, dir: Direction) -> Option<NodeId> {
        match dir {
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn arm_mut(&mut self, dir: Direction) -> &mut Option<NodeId> {
        match dir {
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }

    /// Which arm holds `child`, if any.
    pub fn side_of(&self, child: NodeId) -> Option<Direction> {
        if self.left == Some(child) {
            Some(Direction::Left)
        } else if self.right == Some(child) {
            Some(Direction::Right)
        } else {
            None
        }
    }
}
