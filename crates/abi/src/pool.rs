use alloy::sol;

sol! {
    /// AuctionPool: escrows tokenized domains and runs one English auction per token.
    #[sol(rpc)]
    interface IAuctionPool {
        // Errors
        error OwnableUnauthorizedAccount(address account);
        error ItemDoesNotExist(uint256 tokenId);
        error ItemAlreadySubmitted(uint256 tokenId);
        error AuctionAlreadyActive(uint256 tokenId);
        error AuctionNotActive(uint256 tokenId);
        error AuctionExpired(uint256 tokenId, uint256 endTime);
        error AuctionStillRunning(uint256 tokenId, uint256 endTime);
        error BidTooLow(uint256 highestBid, uint256 offered);
        error NothingToWithdraw(address account);
        error TransferFailed();

        // Bubbled up from the domain token during escrow transfers.
        error ERC721InsufficientApproval(address operator, uint256 tokenId);
        error ERC721IncorrectOwner(address sender, uint256 tokenId, address owner);
        error ERC721NonexistentToken(uint256 tokenId);

        // Events
        event BidPlaced(address indexed bidder, uint256 indexed tokenId, uint256 amount);
        event DomainSubmitted(address indexed seller, uint256 tokenId);
        event AuctionStarted(uint256 tokenId, uint256 endTime);
        event AuctionEnded(uint256 tokenId, address winner, uint256 amount);

        // Views
        function owner() external view returns (address);
        function auctionItems(uint256 tokenId)
            external
            view
            returns (
                address seller,
                uint256 tokenId_,
                uint256 highestBid,
                address highestBidder,
                bool active,
                uint256 endTime,
                bool exists
            );
        function pendingReturns(address account) external view returns (uint256);

        // Entrypoints
        function submitDomain(uint256 tokenId) external;
        function approveAndStartAuction(uint256 tokenId) external;
        function placeBid(uint256 tokenId) external payable;
        function endAuction(uint256 tokenId) external;
        function withdraw() external;
    }
}
