//! The object arena, graph frames, wiring and message delivery
//!
//! All objects of a loaded patch live in one arena owned by [`Patch`];
//! `ObjectId` is the stable identity used everywhere. Each graph (the root
//! canvas, inline subpatches, abstractions) is a frame holding its children in
//! declaration order, the indices `connect` records refer to. Root-only state
//! — the scheduler, the converter rails, the named registries, the print
//! sinks, the clock — lives directly on the `Patch`, which is how child
//! graphs "delegate to the root": there is exactly one root to delegate to.
//!
//! Message delivery is synchronous and depth-first. The node under delivery
//! is moved out of its slot for the duration of the call (so it can never be
//! re-entered) and its emissions are fanned out in order once it returns.

use std::mem;
use std::path::Path;

use tracing::{debug, warn};

use crate::engine::EngineConfig;
use crate::factory::{self, BuiltObject, Registration};
use crate::message::{resolve_dollars, Atom, Message};
use crate::nodes::MessageFloat;
use crate::object::{
    AudioNode, ConnectionType, ControlContext, MessageNode, Outbox, PrintHooks, SignalPrecedence,
};
use crate::patch_parser::Record;
use crate::registry::{NameRegistry, SignalRails};
use crate::scheduler::{Entry, Scheduler};

pub type ObjectId = usize;
pub type GraphId = usize;

/// A connection endpoint: the object on the far side and its outlet (for
/// incoming lists) or inlet (for outgoing lists).
pub(crate) type LetPair = (ObjectId, usize);

pub(crate) struct InletSlot {
    pub incoming: Vec<LetPair>,
}

pub(crate) struct OutletSlot {
    pub kind: ConnectionType,
    pub outgoing: Vec<LetPair>,
}

/// Where a signal inlet reads its samples from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RailSource {
    /// Alias of another object's outlet buffer.
    Object(ObjectId, usize),
    /// The shared silent rail.
    Zero,
}

/// Planner traversal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mark {
    Clean,
    InProgress,
    Done,
}

/// The behaviour living in a slot.
pub(crate) enum NodeKind {
    Message(Box<dyn MessageNode>),
    Audio(Box<dyn AudioNode>),
    /// A nested graph; children and bridges live in the graph frame.
    Graph(GraphId),
    /// Placeholder keeping connect indices stable (comments, unresolved
    /// objects). Also stands in while a node is out on loan to a call.
    Inert,
}

pub(crate) struct Slot {
    pub node: NodeKind,
    pub label: String,
    pub graph: GraphId,
    pub inlets: Vec<InletSlot>,
    pub outlets: Vec<OutletSlot>,
    /// Resolved source per signal inlet.
    pub rails: Vec<RailSource>,
    /// Owned buffer per signal outlet, shared by every sink that aliases it.
    pub dsp_out: Vec<Vec<f32>>,
    pub mark: Mark,
}

/// One canvas: the root patch, an inline subpatch or an abstraction.
pub(crate) struct GraphFrame {
    pub parent: Option<GraphId>,
    /// The slot representing this graph in its parent (None for the root).
    pub object_id: Option<ObjectId>,
    /// Direct children in declaration order; `connect` indices point here.
    pub children: Vec<ObjectId>,
    pub inlet_bridges: Vec<ObjectId>,
    pub outlet_bridges: Vec<ObjectId>,
    /// Element 0 is the unique graph id (the `$0` expansion), the rest are
    /// the instantiation arguments.
    pub args: Vec<Atom>,
    /// Planner output: the signal execution list.
    pub dsp_order: Vec<ObjectId>,
    pub switched: bool,
}

/// A loaded patch: the object arena plus all root-owned runtime state.
pub struct Patch {
    pub(crate) slots: Vec<Slot>,
    pub(crate) graphs: Vec<GraphFrame>,
    pub(crate) scheduler: Scheduler,
    pub(crate) registry: NameRegistry,
    pub(crate) signal_rails: SignalRails,
    pub(crate) config: EngineConfig,
    pub(crate) input_rail: Vec<f32>,
    pub(crate) output_rail: Vec<f32>,
    pub(crate) zero_rail: Vec<f32>,
    pub(crate) block_start: f64,
    pub(crate) block_duration_ms: f64,
    pub(crate) print: PrintHooks,
}

impl Patch {
    pub(crate) fn new_shell(config: EngineConfig) -> Patch {
        let block = config.block_size;
        let block_duration_ms = 1000.0 * block as f64 / config.sample_rate as f64;
        Patch {
            slots: Vec::new(),
            graphs: Vec::new(),
            scheduler: Scheduler::default(),
            registry: NameRegistry::default(),
            signal_rails: SignalRails::new(block),
            input_rail: vec![0.0; config.input_channels * block],
            output_rail: vec![0.0; config.output_channels * block],
            zero_rail: vec![0.0; block],
            block_start: 0.0,
            block_duration_ms,
            print: PrintHooks::default(),
            config,
        }
    }

    // ---- construction ------------------------------------------------

    /// Build one graph from the record stream. The caller has already
    /// consumed the opening canvas record; the loop runs until the matching
    /// restore (or the end of the stream, for a file's root canvas).
    pub(crate) fn build_graph(
        &mut self,
        records: &mut std::vec::IntoIter<Record>,
        parent: Option<GraphId>,
        instantiation_args: Vec<Atom>,
        dir: &Path,
    ) -> Result<GraphId, String> {
        let gid = self.graphs.len();
        let mut args = vec![Atom::Float(gid as f32)];
        args.extend(instantiation_args);
        self.graphs.push(GraphFrame {
            parent,
            object_id: None,
            children: Vec::new(),
            inlet_bridges: Vec::new(),
            outlet_bridges: Vec::new(),
            args,
            dsp_order: Vec::new(),
            switched: true,
        });

        while let Some(record) = records.next() {
            match record {
                Record::Canvas => {
                    let child = self.build_graph(records, Some(gid), Vec::new(), dir)?;
                    self.add_graph_object(gid, child);
                }
                Record::Object { label, mut args } => {
                    resolve_dollars(&mut args, &self.graphs[gid].args);
                    let built = factory::create(self, gid, &label, args, dir);
                    self.add_built(gid, built);
                }
                Record::MessageBox { mut content } => {
                    resolve_dollars(&mut content, &self.graphs[gid].args);
                    self.add_built(gid, factory::message_box(content));
                }
                Record::FloatAtom => {
                    self.add_built(gid, factory::plain(Box::new(MessageFloat::new(0.0))));
                }
                Record::Connect {
                    from,
                    outlet,
                    to,
                    inlet,
                } => {
                    self.connect_index(gid, from, outlet, to, inlet);
                }
                Record::SymbolAtom | Record::Text | Record::Declare => {
                    self.add_built(gid, factory::inert("".into()));
                }
                Record::Restore => break,
            }
        }
        Ok(gid)
    }

    /// Install a built object into a graph: slot creation, declaration-order
    /// indexing, bridge bookkeeping and named-channel registration.
    pub(crate) fn add_built(&mut self, gid: GraphId, built: BuiltObject) -> ObjectId {
        if let NodeKind::Graph(child) = &built.node {
            // abstractions arrive as finished graphs; counts come from bridges
            let child = *child;
            return self.add_graph_object(gid, child);
        }
        let id = self.slots.len();
        let (inlet_count, outlet_count, signal_outlets) = match &built.node {
            NodeKind::Message(n) => (n.inlet_count(), n.outlet_count(), 0),
            NodeKind::Audio(n) => (n.inlet_count(), n.outlet_count(), n.signal_outlet_count()),
            NodeKind::Graph(_) | NodeKind::Inert => (0, 0, 0),
        };
        let inlets = (0..inlet_count)
            .map(|_| InletSlot {
                incoming: Vec::new(),
            })
            .collect();
        let outlets = (0..outlet_count)
            .map(|i| OutletSlot {
                kind: if i < signal_outlets {
                    ConnectionType::Signal
                } else {
                    ConnectionType::Message
                },
                outgoing: Vec::new(),
            })
            .collect();
        self.slots.push(Slot {
            node: built.node,
            label: built.label,
            graph: gid,
            inlets,
            outlets,
            rails: Vec::new(),
            dsp_out: Vec::new(),
            mark: Mark::Clean,
        });
        self.graphs[gid].children.push(id);

        match self.slots[id].label.as_str() {
            "inlet" | "inlet~" => self.graphs[gid].inlet_bridges.push(id),
            "outlet" | "outlet~" => self.graphs[gid].outlet_bridges.push(id),
            _ => {}
        }

        match built.registration {
            Registration::None => {}
            Registration::Send(name) => {
                if self.registry.register_send(&name, id) {
                    let mut k = 0;
                    loop {
                        let Some(receiver) = self.registry.receiver_at(&name, k) else {
                            break;
                        };
                        self.connect_objects(id, 0, receiver, 0);
                        k += 1;
                    }
                } else {
                    self.print
                        .print_err(&format!("send object with duplicate name \"{}\"", name));
                }
            }
            Registration::Receive(name) => {
                self.registry.register_receive(&name, id);
                if let Some(sender) = self.registry.send_for(&name) {
                    self.connect_objects(sender, 0, id, 0);
                }
            }
            Registration::SendSignal(name) => {
                if self.registry.register_dsp_send(&name, id) {
                    self.signal_rails.ensure_send(&name);
                } else {
                    self.print
                        .print_err(&format!("send~ object with duplicate name \"{}\"", name));
                }
            }
            Registration::ReceiveSignal(name) => {
                self.signal_rails.ensure_send(&name);
            }
            Registration::ThrowSignal(name) | Registration::CatchSignal(name) => {
                self.signal_rails.ensure_throw(&name);
            }
        }
        id
    }

    /// Install a finished subpatch as an object of its parent graph. Its
    /// inlet and outlet counts come from the bridge objects declared inside.
    pub(crate) fn add_graph_object(&mut self, parent: GraphId, child: GraphId) -> ObjectId {
        let id = self.slots.len();
        let inlets = (0..self.graphs[child].inlet_bridges.len())
            .map(|_| InletSlot {
                incoming: Vec::new(),
            })
            .collect();
        let outlets = self.graphs[child]
            .outlet_bridges
            .iter()
            .map(|&bridge| OutletSlot {
                kind: if self.slots[bridge].label == "outlet~" {
                    ConnectionType::Signal
                } else {
                    ConnectionType::Message
                },
                outgoing: Vec::new(),
            })
            .collect();
        self.slots.push(Slot {
            node: NodeKind::Graph(child),
            label: "pd".into(),
            graph: parent,
            inlets,
            outlets,
            rails: Vec::new(),
            dsp_out: Vec::new(),
            mark: Mark::Clean,
        });
        self.graphs[parent].children.push(id);
        self.graphs[child].object_id = Some(id);
        id
    }

    /// Wire two objects of the same graph by their declaration indices.
    pub(crate) fn connect_index(
        &mut self,
        gid: GraphId,
        from: usize,
        outlet: usize,
        to: usize,
        inlet: usize,
    ) {
        let children = &self.graphs[gid].children;
        let (Some(&from_id), Some(&to_id)) = (children.get(from), children.get(to)) else {
            self.print.print_err(&format!(
                "connect: object index out of range ({} -> {})",
                from, to
            ));
            return;
        };
        self.connect_objects(from_id, outlet, to_id, inlet);
    }

    /// Install a bidirectional connection. For a subpatch source, the
    /// matching outlet bridge inside the child graph is wired to the same
    /// targets so its emissions leave the graph.
    pub(crate) fn connect_objects(
        &mut self,
        from: ObjectId,
        outlet: usize,
        to: ObjectId,
        inlet: usize,
    ) {
        if outlet >= self.slots[from].outlets.len() || inlet >= self.slots[to].inlets.len() {
            self.print.print_err(&format!(
                "connect: no such outlet or inlet ({}:{} -> {}:{})",
                self.slots[from].label, outlet, self.slots[to].label, inlet
            ));
            return;
        }
        self.slots[from].outlets[outlet].outgoing.push((to, inlet));
        self.slots[to].inlets[inlet].incoming.push((from, outlet));

        let subgraph = match &self.slots[from].node {
            NodeKind::Graph(g) => Some(*g),
            _ => None,
        };
        if let Some(g) = subgraph {
            if let Some(&bridge) = self.graphs[g].outlet_bridges.get(outlet) {
                if let Some(out) = self.slots[bridge].outlets.get_mut(0) {
                    out.outgoing.push((to, inlet));
                }
            }
        }
    }

    // ---- signal wiring -----------------------------------------------

    pub(crate) fn outlet_kind(&self, id: ObjectId, outlet: usize) -> Option<ConnectionType> {
        self.slots[id].outlets.get(outlet).map(|o| o.kind)
    }

    /// Follow a source through subpatch boundaries to the object whose
    /// buffer actually carries the samples.
    fn resolve_rail(&self, mut src: ObjectId, mut outlet: usize) -> RailSource {
        loop {
            match &self.slots[src].node {
                NodeKind::Graph(g) => match self.graphs[*g].outlet_bridges.get(outlet) {
                    Some(&bridge) => {
                        src = bridge;
                        outlet = 0;
                    }
                    None => return RailSource::Zero,
                },
                _ => return RailSource::Object(src, outlet),
            }
        }
    }

    /// Resolve every signal inlet to its source buffer, fix each signal
    /// object's precedence from the resolved wiring, and allocate outlet
    /// buffers. Runs once after construction.
    pub(crate) fn resolve_rails(&mut self) {
        let block = self.config.block_size;
        for id in 0..self.slots.len() {
            let (signal_inlets, signal_outlets) = match &self.slots[id].node {
                NodeKind::Audio(n) => (n.signal_inlet_count(), n.signal_outlet_count()),
                _ => continue,
            };
            let mut rails = Vec::with_capacity(signal_inlets);
            let mut fed = [false; 2];
            for inlet in 0..signal_inlets.min(self.slots[id].inlets.len()) {
                let mut source = RailSource::Zero;
                let mut count = 0;
                for &(up, up_outlet) in &self.slots[id].inlets[inlet].incoming {
                    if self.outlet_kind(up, up_outlet) == Some(ConnectionType::Signal) {
                        count += 1;
                        match self.resolve_rail(up, up_outlet) {
                            RailSource::Object(o, _) if o == id => {
                                warn!(label = self.slots[id].label.as_str(), "signal self-loop reads silence");
                            }
                            resolved => source = resolved,
                        }
                    }
                }
                if count > 1 {
                    warn!(
                        label = self.slots[id].label.as_str(),
                        inlet, "multiple signal connections alias one inlet; last wiring wins"
                    );
                }
                if inlet < 2 {
                    fed[inlet] = source != RailSource::Zero;
                }
                rails.push(source);
            }
            let precedence = match (fed[0], fed[1]) {
                (true, true) => SignalPrecedence::DspDsp,
                (true, false) => SignalPrecedence::DspMessage,
                (false, true) => SignalPrecedence::MessageDsp,
                (false, false) => SignalPrecedence::MessageMessage,
            };
            self.slots[id].rails = rails;
            self.slots[id].dsp_out = vec![vec![0.0; block]; signal_outlets];
            if let NodeKind::Audio(node) = &mut self.slots[id].node {
                node.state_mut().precedence = precedence;
            }
        }

        // signal inlet bridges read whatever feeds the enclosing graph object
        for g in 0..self.graphs.len() {
            let Some(object_id) = self.graphs[g].object_id else {
                continue;
            };
            for k in 0..self.graphs[g].inlet_bridges.len() {
                let bridge = self.graphs[g].inlet_bridges[k];
                if !matches!(self.slots[bridge].node, NodeKind::Audio(_)) {
                    continue;
                }
                let mut source = RailSource::Zero;
                for &(up, up_outlet) in &self.slots[object_id].inlets[k].incoming {
                    if self.outlet_kind(up, up_outlet) == Some(ConnectionType::Signal) {
                        source = self.resolve_rail(up, up_outlet);
                    }
                }
                self.slots[bridge].rails = vec![source];
                if let NodeKind::Audio(node) = &mut self.slots[bridge].node {
                    node.state_mut().precedence = if source == RailSource::Zero {
                        SignalPrecedence::MessageMessage
                    } else {
                        SignalPrecedence::DspMessage
                    };
                }
            }
        }
    }

    // ---- message delivery ---------------------------------------------

    /// Deliver one message to an object's inlet, synchronously. Subpatch
    /// targets route to the matching inlet bridge.
    pub(crate) fn deliver(&mut self, target: ObjectId, inlet: usize, message: &Message) {
        if target >= self.slots.len() {
            self.print
                .print_err(&format!("message for unknown object {}", target));
            return;
        }
        match mem::replace(&mut self.slots[target].node, NodeKind::Inert) {
            NodeKind::Graph(g) => {
                self.slots[target].node = NodeKind::Graph(g);
                match self.graphs[g].inlet_bridges.get(inlet) {
                    Some(&bridge) => self.deliver(bridge, 0, message),
                    None => self
                        .print
                        .print_err(&format!("subpatch has no inlet {}", inlet)),
                }
            }
            NodeKind::Message(mut node) => {
                let mut outbox = Outbox::default();
                {
                    let mut ctx = ControlContext {
                        outbox: &mut outbox,
                        print: &self.print,
                        block_start: self.block_start,
                        sample_rate: self.config.sample_rate,
                        block_size: self.config.block_size,
                    };
                    node.process_message(inlet, message, &mut ctx);
                }
                self.slots[target].node = NodeKind::Message(node);
                self.flush_outbox(target, outbox);
            }
            NodeKind::Audio(node) => {
                self.slots[target].node = NodeKind::Audio(node);
                self.audio_call(target, |node, frame, ctx| {
                    node.process_message(inlet, message, frame, ctx)
                });
            }
            NodeKind::Inert => {
                // genuine placeholder, or a node re-entered while on loan
                self.slots[target].node = NodeKind::Inert;
            }
        }
    }

    /// Fan a message out of an outlet, depth-first in wiring order. Iteration
    /// is by index with a length re-check so delivery cannot invalidate it.
    pub(crate) fn send_from(&mut self, source: ObjectId, outlet: usize, message: &Message) {
        let mut k = 0;
        loop {
            let Some(&(target, inlet)) = self.slots[source]
                .outlets
                .get(outlet)
                .and_then(|o| o.outgoing.get(k))
            else {
                break;
            };
            self.deliver(target, inlet, message);
            k += 1;
        }
    }

    /// Deliver a message to every receiver bound to `name`, in registration
    /// order. Always runs against the root registry.
    pub fn dispatch_to_named_receivers(&mut self, name: &str, message: &Message) {
        let mut k = 0;
        loop {
            let Some(receiver) = self.registry.receiver_at(name, k) else {
                break;
            };
            self.deliver(receiver, 0, message);
            k += 1;
        }
    }

    /// Run a scheduled entry: the reservation was already dropped with the
    /// queue entry; give the target its pre-send hook, then fan out.
    pub(crate) fn fire(&mut self, entry: Entry) {
        if entry.target >= self.slots.len() {
            self.print
                .print_err(&format!("scheduled message for unknown object {}", entry.target));
            return;
        }
        match mem::replace(&mut self.slots[entry.target].node, NodeKind::Inert) {
            NodeKind::Message(mut node) => {
                let mut outbox = Outbox::default();
                {
                    let mut ctx = ControlContext {
                        outbox: &mut outbox,
                        print: &self.print,
                        block_start: self.block_start,
                        sample_rate: self.config.sample_rate,
                        block_size: self.config.block_size,
                    };
                    node.scheduled_hook(entry.outlet, &entry.message, &mut ctx);
                }
                self.slots[entry.target].node = NodeKind::Message(node);
                self.flush_outbox(entry.target, outbox);
            }
            other => self.slots[entry.target].node = other,
        }
        self.send_from(entry.target, entry.outlet, &entry.message);
    }

    /// Apply one node call's collected effects: cancellations, then schedule
    /// requests, then synchronous sends in emission order, then named
    /// dispatches.
    pub(crate) fn flush_outbox(&mut self, source: ObjectId, outbox: Outbox) {
        for (outlet, handle) in outbox.cancels {
            self.scheduler.cancel(source, outlet, &handle);
        }
        for (outlet, message) in outbox.schedules {
            self.scheduler.insert(source, outlet, message);
        }
        for (outlet, message) in outbox.sends {
            self.send_from(source, outlet, &message);
        }
        for (name, message) in outbox.named {
            self.dispatch_to_named_receivers(&name, &message);
        }
    }

    /// Run a closure against a signal node with its frame assembled: resolved
    /// input rails, its own outlet buffers (taken out for the call), the
    /// converter rails and the named signal rails.
    pub(crate) fn audio_call<F>(&mut self, id: ObjectId, f: F)
    where
        F: FnOnce(&mut dyn AudioNode, &mut crate::object::DspFrame<'_>, &mut ControlContext<'_>),
    {
        let mut node = match mem::replace(&mut self.slots[id].node, NodeKind::Inert) {
            NodeKind::Audio(n) => n,
            other => {
                self.slots[id].node = other;
                return;
            }
        };
        let mut outputs = mem::take(&mut self.slots[id].dsp_out);
        let mut outbox = Outbox::default();
        {
            let slots = &self.slots;
            let zero = self.zero_rail.as_slice();
            let inputs: Vec<&[f32]> = slots[id]
                .rails
                .iter()
                .map(|rail| match rail {
                    RailSource::Object(o, k) => slots[*o]
                        .dsp_out
                        .get(*k)
                        .map(|buffer| buffer.as_slice())
                        .unwrap_or(zero),
                    RailSource::Zero => zero,
                })
                .collect();
            let mut frame = crate::object::DspFrame {
                inputs: &inputs,
                outputs: &mut outputs,
                adc: &self.input_rail,
                dac: &mut self.output_rail,
                rails: &mut self.signal_rails,
                block_start: self.block_start,
                sample_rate: self.config.sample_rate,
                block_size: self.config.block_size,
            };
            let mut ctx = ControlContext {
                outbox: &mut outbox,
                print: &self.print,
                block_start: self.block_start,
                sample_rate: self.config.sample_rate,
                block_size: self.config.block_size,
            };
            f(node.as_mut(), &mut frame, &mut ctx);
        }
        self.slots[id].dsp_out = outputs;
        self.slots[id].node = NodeKind::Audio(node);
        self.flush_outbox(id, outbox);
    }

    /// Give every object its post-construction bang.
    pub(crate) fn fire_loadbangs(&mut self) {
        for id in 0..self.slots.len() {
            if !matches!(self.slots[id].node, NodeKind::Message(_)) {
                continue;
            }
            let NodeKind::Message(mut node) =
                mem::replace(&mut self.slots[id].node, NodeKind::Inert)
            else {
                continue;
            };
            let mut outbox = Outbox::default();
            {
                let mut ctx = ControlContext {
                    outbox: &mut outbox,
                    print: &self.print,
                    block_start: self.block_start,
                    sample_rate: self.config.sample_rate,
                    block_size: self.config.block_size,
                };
                node.load_bang(&mut ctx);
            }
            self.slots[id].node = NodeKind::Message(node);
            self.flush_outbox(id, outbox);
        }
    }

    // ---- inspection ----------------------------------------------------

    pub fn object_count(&self) -> usize {
        self.slots.len()
    }

    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    pub fn object_label(&self, id: ObjectId) -> Option<&str> {
        self.slots.get(id).map(|s| s.label.as_str())
    }

    /// All objects carrying a class label, in construction order.
    pub fn objects_with_label(&self, label: &str) -> Vec<ObjectId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.label == label)
            .map(|(id, _)| id)
            .collect()
    }

    /// First object with the label, if any.
    pub fn find_object(&self, label: &str) -> Option<ObjectId> {
        self.slots.iter().position(|s| s.label == label)
    }

    /// Declaration-order children of a graph (graph 0 is the root canvas).
    pub fn graph_children(&self, graph: GraphId) -> &[ObjectId] {
        self.graphs
            .get(graph)
            .map(|g| g.children.as_slice())
            .unwrap_or(&[])
    }

    /// The planner-computed signal execution list of a graph.
    pub fn signal_execution_list(&self, graph: GraphId) -> &[ObjectId] {
        self.graphs
            .get(graph)
            .map(|g| g.dsp_order.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn debug_dump_order(&self, graph: GraphId) {
        for &id in &self.graphs[graph].dsp_order {
            debug!(graph, label = self.slots[id].label.as_str(), "signal order");
        }
    }
}
